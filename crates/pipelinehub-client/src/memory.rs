//! In-memory implementation of [`RecordApi`].
//!
//! Behaves like the remote service for everything the gateways rely on:
//! id assignment, audit timestamps, `Contains` / `EqualTo` filters,
//! ordering, paging, projections, and per-record rejections. Tests can
//! additionally script failures, silent writes, and fetch latency.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use pipelinehub_core::{Error, FieldError, RecordId, Result};
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::api::RecordApi;
use crate::wire::{
    ApiResponse, BackendRecord, DeleteParams, FetchQuery, Operator, RecordResult,
    RecordsPayload, SortType, WhereClause,
};

/// The five record API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `fetch_records`
    Fetch,
    /// `get_record_by_id`
    Get,
    /// `create_record`
    Create,
    /// `update_record`
    Update,
    /// `delete_record`
    Delete,
}

/// A call observed by the in-memory API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Operation invoked
    pub operation: Operation,
    /// Table addressed
    pub table: String,
}

#[derive(Debug, Clone)]
enum Injected {
    Reject(String),
    Disconnect,
}

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: Vec<BackendRecord>,
}

#[derive(Debug)]
struct State {
    tables: HashMap<String, Table>,
    required: HashMap<String, Vec<String>>,
    injected: VecDeque<(Operation, Injected)>,
    fetch_delays: VecDeque<Duration>,
    echo_writes: bool,
    calls: Vec<Call>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
            required: HashMap::new(),
            injected: VecDeque::new(),
            fetch_delays: VecDeque::new(),
            echo_writes: true,
            calls: Vec::new(),
            last_stamp: None,
        }
    }
}

impl State {
    /// Strictly increasing timestamps so `ModifiedOn` ordering is total.
    fn stamp(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last_stamp {
            if now <= last {
                now = last + chrono::Duration::milliseconds(1);
            }
        }
        self.last_stamp = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn enter(&mut self, operation: Operation, table: &str) -> Option<Injected> {
        self.calls.push(Call {
            operation,
            table: table.to_string(),
        });
        let index = self.injected.iter().position(|(op, _)| *op == operation)?;
        self.injected.remove(index).map(|(_, injected)| injected)
    }

    fn missing_required(&self, table: &str, record: &BackendRecord, creating: bool) -> Vec<FieldError> {
        let Some(required) = self.required.get(table) else {
            return Vec::new();
        };
        required
            .iter()
            .filter(|field| match record.get(field.as_str()) {
                None => creating,
                Some(value) => is_blank(value),
            })
            .map(|field| FieldError {
                field_label: field.clone(),
                message: "is required".to_string(),
            })
            .collect()
    }
}

/// In-process record API.
#[derive(Debug, Default)]
pub struct MemoryRecordApi {
    state: Mutex<State>,
}

impl MemoryRecordApi {
    /// An API with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts records directly, assigning ids and timestamps where missing.
    pub async fn seed(&self, table: &str, records: Vec<BackendRecord>) -> Vec<RecordId> {
        let mut state = self.state.lock().await;
        let mut ids = Vec::with_capacity(records.len());
        for mut record in records {
            let stamp = state.stamp();
            let rows = state.tables.entry(table.to_string()).or_default();
            let id = match record.get("Id").and_then(Value::as_i64) {
                Some(id) => {
                    rows.last_id = rows.last_id.max(id);
                    id
                }
                None => {
                    rows.last_id += 1;
                    rows.last_id
                }
            };
            record.insert("Id".to_string(), json!(id));
            record.entry("CreatedOn").or_insert_with(|| json!(stamp));
            record.entry("ModifiedOn").or_insert_with(|| json!(stamp));
            rows.rows.push(record);
            ids.push(RecordId::new(id));
        }
        ids
    }

    /// Current rows of `table`, in insertion order.
    pub async fn records(&self, table: &str) -> Vec<BackendRecord> {
        let state = self.state.lock().await;
        state
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Rejects writes to `table` whose `fields` are missing or blank.
    pub async fn require_fields(&self, table: &str, fields: &[&str]) {
        let mut state = self.state.lock().await;
        state.required.insert(
            table.to_string(),
            fields.iter().map(|f| (*f).to_string()).collect(),
        );
    }

    /// The next `operation` answers `success: false` with `message`.
    pub async fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        let mut state = self.state.lock().await;
        state
            .injected
            .push_back((operation, Injected::Reject(message.into())));
    }

    /// The next `operation` fails before reaching the service.
    pub async fn disconnect_next(&self, operation: Operation) {
        let mut state = self.state.lock().await;
        state.injected.push_back((operation, Injected::Disconnect));
    }

    /// Whether create and update results carry the stored record.
    pub async fn set_echo_writes(&self, echo: bool) {
        self.state.lock().await.echo_writes = echo;
    }

    /// Delays the response of the next fetch; data is read before the delay.
    pub async fn delay_next_fetch(&self, delay: Duration) {
        self.state.lock().await.fetch_delays.push_back(delay);
    }

    /// Calls observed so far.
    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    /// Number of calls of `operation` observed so far.
    pub async fn call_count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }
}

fn injected_response(injected: Injected, operation: Operation) -> Result<ApiResponse> {
    match injected {
        Injected::Reject(message) => Ok(ApiResponse::failure(message)),
        Injected::Disconnect => Err(Error::transport(format!(
            "connection reset during {operation:?}"
        ))),
    }
}

#[async_trait]
impl RecordApi for MemoryRecordApi {
    async fn fetch_records(&self, table: &str, query: &FetchQuery) -> Result<ApiResponse> {
        let (response, delay) = {
            let mut state = self.state.lock().await;
            let delay = state.fetch_delays.pop_front();
            if let Some(injected) = state.enter(Operation::Fetch, table) {
                (injected_response(injected, Operation::Fetch), delay)
            } else {
                let rows = state
                    .tables
                    .get(table)
                    .map(|t| t.rows.as_slice())
                    .unwrap_or_default();
                (Ok(ApiResponse::with_data(Value::Array(run_query(rows, query)))), delay)
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        query: &FetchQuery,
    ) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(injected) = state.enter(Operation::Get, table) {
            return injected_response(injected, Operation::Get);
        }
        let found = state
            .tables
            .get(table)
            .and_then(|t| t.rows.iter().find(|row| row_id(row) == Some(id.get())))
            .map(|row| Value::Object(project(row, query)));
        Ok(ApiResponse {
            success: true,
            data: found,
            ..ApiResponse::default()
        })
    }

    async fn create_record(&self, table: &str, payload: &RecordsPayload) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(injected) = state.enter(Operation::Create, table) {
            return injected_response(injected, Operation::Create);
        }
        let mut results = Vec::with_capacity(payload.records.len());
        for record in &payload.records {
            let missing = state.missing_required(table, record, true);
            if !missing.is_empty() {
                results.push(RecordResult::failed("Required fields missing", missing));
                continue;
            }
            let stamp = state.stamp();
            let echo = state.echo_writes;
            let rows = state.tables.entry(table.to_string()).or_default();
            rows.last_id += 1;
            let mut row = record.clone();
            row.insert("Id".to_string(), json!(rows.last_id));
            row.insert("CreatedOn".to_string(), json!(stamp));
            row.insert("ModifiedOn".to_string(), json!(stamp));
            rows.rows.push(row.clone());
            results.push(RecordResult::ok(echo.then_some(row)));
        }
        tracing::debug!(table, count = results.len(), "memory create");
        Ok(ApiResponse::with_results(results))
    }

    async fn update_record(&self, table: &str, payload: &RecordsPayload) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(injected) = state.enter(Operation::Update, table) {
            return injected_response(injected, Operation::Update);
        }
        let mut results = Vec::with_capacity(payload.records.len());
        for record in &payload.records {
            let Some(id) = row_id(record) else {
                results.push(RecordResult::failed("Id is required for update", Vec::new()));
                continue;
            };
            let missing = state.missing_required(table, record, false);
            if !missing.is_empty() {
                results.push(RecordResult::failed("Required fields missing", missing));
                continue;
            }
            let stamp = state.stamp();
            let echo = state.echo_writes;
            let row = state
                .tables
                .get_mut(table)
                .and_then(|t| t.rows.iter_mut().find(|row| row_id(row) == Some(id)));
            match row {
                Some(row) => {
                    for (key, value) in record {
                        if !matches!(key.as_str(), "Id" | "CreatedOn" | "ModifiedOn") {
                            row.insert(key.clone(), value.clone());
                        }
                    }
                    row.insert("ModifiedOn".to_string(), json!(stamp));
                    results.push(RecordResult::ok(echo.then(|| row.clone())));
                }
                None => results.push(RecordResult::failed("Record not found", Vec::new())),
            }
        }
        Ok(ApiResponse::with_results(results))
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<ApiResponse> {
        let mut state = self.state.lock().await;
        if let Some(injected) = state.enter(Operation::Delete, table) {
            return injected_response(injected, Operation::Delete);
        }
        let mut results = Vec::with_capacity(params.record_ids.len());
        for id in &params.record_ids {
            let removed = state.tables.get_mut(table).is_some_and(|t| {
                let before = t.rows.len();
                t.rows.retain(|row| row_id(row) != Some(id.get()));
                t.rows.len() < before
            });
            results.push(if removed {
                RecordResult::ok(None)
            } else {
                RecordResult::failed("Record not found", Vec::new())
            });
        }
        Ok(ApiResponse::with_results(results))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// Query evaluation
// ============================================================================

fn row_id(row: &BackendRecord) -> Option<i64> {
    match row.get("Id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(obj) => obj
            .get("Id")
            .or_else(|| obj.get("id"))
            .map(text_of)
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn clause_matches(row: &BackendRecord, clause: &WhereClause) -> bool {
    let field = row.get(&clause.field_name).map(text_of).unwrap_or_default();
    let hit = clause.values.iter().any(|wanted| {
        let wanted = text_of(wanted);
        match clause.operator {
            Operator::Contains => field.to_lowercase().contains(&wanted.to_lowercase()),
            Operator::EqualTo => field == wanted,
        }
    });
    hit == clause.include
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => text_of(x).cmp(&text_of(y)),
    }
}

fn project(row: &BackendRecord, query: &FetchQuery) -> BackendRecord {
    if query.fields.is_empty() {
        return row.clone();
    }
    let mut out = BackendRecord::new();
    if let Some(id) = row.get("Id") {
        out.insert("Id".to_string(), id.clone());
    }
    for field in &query.fields {
        if let Some(value) = row.get(&field.field.name) {
            out.insert(field.field.name.clone(), value.clone());
        }
    }
    out
}

fn run_query(rows: &[BackendRecord], query: &FetchQuery) -> Vec<Value> {
    let mut matched: Vec<&BackendRecord> = rows
        .iter()
        .filter(|row| query.where_clauses.iter().all(|c| clause_matches(row, c)))
        .collect();

    matched.sort_by(|a, b| {
        query
            .order_by
            .iter()
            .map(|order| {
                let ord = compare_values(a.get(&order.field_name), b.get(&order.field_name));
                match order.sorttype {
                    SortType::Asc => ord,
                    SortType::Desc => ord.reverse(),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let paging = query.paging_info.unwrap_or_default();
    matched
        .into_iter()
        .skip(paging.offset as usize)
        .take(paging.limit as usize)
        .map(|row| Value::Object(project(row, query)))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
