//! JSON shapes exchanged with the record API.
//!
//! Field names follow the API exactly, including its mixed casing
//! (`FieldName`, `orderBy`, `sorttype`, `RecordIds`).

use pipelinehub_core::{Error, FieldError, RecordFailure, RecordId, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default page size for list queries.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// A backend-named record.
pub type BackendRecord = Map<String, Value>;

/// `{"field": {"Name": "<backend field>"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    /// The projected field
    pub field: FieldName,
}

/// `{"Name": "<backend field>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    /// Backend field name
    #[serde(rename = "Name")]
    pub name: String,
}

impl FieldRef {
    /// Projects `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
        }
    }
}

/// Comparison applied by a where clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Case-insensitive substring match.
    Contains,
    /// Exact match.
    EqualTo,
}

/// One server-side filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Backend field name
    #[serde(rename = "FieldName")]
    pub field_name: String,
    /// Comparison
    #[serde(rename = "Operator")]
    pub operator: Operator,
    /// Accepted values; a record matches if any value matches
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
    /// Keep (`true`) or drop (`false`) matching records
    #[serde(rename = "Include", default = "default_include")]
    pub include: bool,
}

fn default_include() -> bool {
    true
}

impl WhereClause {
    /// `field` contains `text`.
    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            operator: Operator::Contains,
            values: vec![Value::String(text.into())],
            include: true,
        }
    }

    /// `field` equals `value`.
    pub fn equal_to(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field_name: field.into(),
            operator: Operator::EqualTo,
            values: vec![value.into()],
            include: true,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortType {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Server-side ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Backend field name
    #[serde(rename = "fieldName")]
    pub field_name: String,
    /// Direction
    pub sorttype: SortType,
}

/// Page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// Maximum records returned
    pub limit: u32,
    /// Records skipped
    pub offset: u32,
}

impl Default for PagingInfo {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Parameters of `fetch_records` and `get_record_by_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchQuery {
    /// Projected fields; empty means every field
    #[serde(default)]
    pub fields: Vec<FieldRef>,
    /// Filter conditions, all of which must hold
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<WhereClause>,
    /// Ordering
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    /// Page window
    #[serde(rename = "pagingInfo", default, skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<PagingInfo>,
}

impl FetchQuery {
    /// A query projecting `fields`.
    pub fn select<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(FieldRef::new).collect(),
            ..Self::default()
        }
    }

    /// Adds a filter condition.
    pub fn filter(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    /// Adds an ordering.
    pub fn order(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.into(),
            sorttype: if descending {
                SortType::Desc
            } else {
                SortType::Asc
            },
        });
        self
    }

    /// Sets the page window.
    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.paging_info = Some(PagingInfo { limit, offset });
        self
    }
}

/// `{"records": [...]}` body of create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordsPayload {
    /// Backend-named records
    pub records: Vec<BackendRecord>,
}

impl RecordsPayload {
    /// Wraps `records`.
    pub fn new(records: Vec<BackendRecord>) -> Self {
        Self { records }
    }
}

/// `{"RecordIds": [...]}` body of delete calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteParams {
    /// Records to remove
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<RecordId>,
}

impl DeleteParams {
    /// Deletes `ids`.
    pub fn new(ids: Vec<RecordId>) -> Self {
        Self { record_ids: ids }
    }
}

/// Outcome of one record in a batch call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    /// Whether this record was accepted
    pub success: bool,
    /// Record-level message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stored record, when echoed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BackendRecord>,
    /// Field-level errors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl RecordResult {
    /// An accepted record.
    pub fn ok(data: Option<BackendRecord>) -> Self {
        Self {
            success: true,
            data,
            ..Self::default()
        }
    }

    /// A refused record.
    pub fn failed(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors,
        }
    }

    /// The failure details of a refused record.
    pub fn to_failure(&self) -> RecordFailure {
        RecordFailure {
            message: self.message.clone(),
            errors: self.errors.clone(),
        }
    }
}

/// Envelope of every record API response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the call as a whole succeeded
    pub success: bool,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Record or record list of read calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Per-record outcomes of write calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordResult>>,
}

impl ApiResponse {
    /// A successful read response.
    pub fn with_data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    /// A successful write response.
    pub fn with_results(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            results: Some(results),
            ..Self::default()
        }
    }

    /// A whole-call failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Converts `success: false` into [`Error::Api`].
    pub fn ensure_success(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::api(
                self.message
                    .unwrap_or_else(|| "request failed without a message".to_string()),
            ))
        }
    }

    /// Records of a list response; a missing `data` is an empty list.
    pub fn into_records(self) -> Result<Vec<BackendRecord>> {
        let response = self.ensure_success()?;
        match response.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            Some(_) => Err(Error::api("expected a record list in response data")),
        }
    }

    /// Record of a by-id response, if any.
    pub fn into_record(self) -> Result<Option<BackendRecord>> {
        let response = self.ensure_success()?;
        match response.data {
            Some(Value::Object(map)) => Ok(Some(map)),
            _ => Ok(None),
        }
    }

    /// Per-record outcomes of a write response.
    pub fn into_results(self) -> Result<Vec<RecordResult>> {
        Ok(self.ensure_success()?.results.unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================
