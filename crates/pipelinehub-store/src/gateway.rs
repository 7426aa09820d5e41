//! Per-entity CRUD over the record API.
//!
//! A [`Gateway`] translates typed records to backend-named maps on the way
//! out and back on the way in. Every method returns a uniform
//! [`Result`]; deciding whether to notify the user is left to the caller.

use pipelinehub_client::{
    ApiResponse, BackendRecord, DeleteParams, FetchQuery, RecordApi, RecordResult,
    RecordsPayload, WhereClause,
    wire::DEFAULT_PAGE_LIMIT,
};
use pipelinehub_core::fields::{self, FieldSelection};
use pipelinehub_core::records::{Activity, Deal};
use pipelinehub_core::{Changes, Entity, Error, RecordFailure, RecordId, Result};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Server-side narrowing of a list query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Case-insensitive substring matched against the entity's search field
    pub search: Option<String>,
    /// Exact value of the entity's status field
    pub status: Option<String>,
    /// Additional exact matches on backend fields
    pub equals: Vec<(String, Value)>,
}

impl ListFilter {
    /// Every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Records whose search field contains `text`.
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Narrows to records whose status is `status`.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Narrows to records whose backend `field` equals `value`.
    pub fn with_equal(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }
}

/// Result of a batch write.
///
/// Records the backend accepted but did not echo are counted in `silent`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    /// Accepted records, as stored by the backend
    pub succeeded: Vec<T>,
    /// Records accepted without an echo
    pub silent: usize,
    /// Refused records with their reasons
    pub failed: Vec<RecordFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            silent: 0,
            failed: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    /// Returns `true` if no record was refused.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of records the backend accepted.
    pub fn accepted(&self) -> usize {
        self.succeeded.len() + self.silent
    }

    /// One notification message per refused record detail.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failed.iter().flat_map(RecordFailure::messages).collect()
    }

    /// Collapses a single-record outcome.
    ///
    /// Refusal becomes [`Error::Rejected`]; an accepted record without echo
    /// becomes `Ok(None)`.
    pub fn into_single(mut self, entity: &str) -> Result<Option<T>> {
        if self.accepted() == 0 && !self.failed.is_empty() {
            return Err(Error::Rejected {
                entity: entity.to_string(),
                failures: self.failed,
            });
        }
        Ok(self.succeeded.pop())
    }
}

/// CRUD access to the table of entity `E`.
pub struct Gateway<E: Entity> {
    api: Arc<dyn RecordApi>,
    page_limit: u32,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Gateway<E> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            page_limit: self.page_limit,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Gateway<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("entity", &E::KIND)
            .field("table", &E::TABLE)
            .field("api", &self.api.name())
            .finish()
    }
}

impl<E: Entity> Gateway<E> {
    /// A gateway over `api` with the default page size.
    pub fn new(api: Arc<dyn RecordApi>) -> Self {
        Self {
            api,
            page_limit: DEFAULT_PAGE_LIMIT,
            _entity: PhantomData,
        }
    }

    /// Overrides the page size of list queries.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    fn projection() -> FetchQuery {
        FetchQuery::select(fields::backend_names(E::FIELDS))
    }

    fn list_query(&self, filter: &ListFilter) -> Result<FetchQuery> {
        let mut query = Self::projection()
            .order(E::DEFAULT_ORDER.field, E::DEFAULT_ORDER.descending)
            .page(self.page_limit, 0);

        if let Some(text) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(WhereClause::contains(E::SEARCH_FIELD, text));
        }
        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            let field = E::STATUS_FIELD.ok_or_else(|| {
                Error::validation_field("status", format!("{} has no status field", E::KIND))
            })?;
            query = query.filter(WhereClause::equal_to(field, status));
        }
        for (field, value) in &filter.equals {
            query = query.filter(WhereClause::equal_to(field.clone(), value.clone()));
        }
        Ok(query)
    }

    fn parse_all(records: Vec<BackendRecord>) -> Result<Vec<E>> {
        records.iter().map(E::from_backend).collect()
    }

    /// Lists records matching `filter` in the entity's default order.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<E>> {
        let query = self.list_query(filter)?;
        tracing::debug!(entity = %E::KIND, table = E::TABLE, "list");
        let records = self.api.fetch_records(E::TABLE, &query).await?.into_records()?;
        Self::parse_all(records)
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the backend returns no record.
    pub async fn get(&self, id: RecordId) -> Result<E> {
        tracing::debug!(entity = %E::KIND, %id, "get");
        let record = self
            .api
            .get_record_by_id(E::TABLE, id, &Self::projection())
            .await?
            .into_record()?
            .ok_or_else(|| Error::not_found(E::KIND.name(), id))?;
        E::from_backend(&record)
    }

    /// Creates one record after client-side validation.
    ///
    /// Returns the stored record, or `None` if the backend accepted it
    /// without echoing it back.
    pub async fn create(&self, record: &E) -> Result<Option<E>> {
        self.create_many(std::slice::from_ref(record))
            .await?
            .into_single(E::KIND.name())
    }

    /// Creates several records in one call.
    ///
    /// Validation runs on every record before anything is sent.
    pub async fn create_many(&self, records: &[E]) -> Result<BatchOutcome<E>> {
        let mut backend = Vec::with_capacity(records.len());
        for record in records {
            record.validate()?;
            backend.push(record.to_backend(FieldSelection::Create)?);
        }
        tracing::debug!(entity = %E::KIND, count = backend.len(), "create");
        let response = self
            .api
            .create_record(E::TABLE, &RecordsPayload::new(backend))
            .await?;
        self.collect_outcome(response)
    }

    /// Applies `changes` to one record; only the fields set are sent.
    ///
    /// Returns the updated record, or `None` if the backend did not echo it.
    pub async fn update(&self, id: RecordId, changes: &Changes) -> Result<Option<E>> {
        self.update_many(&[(id, changes.clone())])
            .await?
            .into_single(E::KIND.name())
    }

    /// Validates and writes every writable field of `record`.
    pub async fn update_record(&self, record: &E) -> Result<Option<E>> {
        record.validate()?;
        if !record.id().is_assigned() {
            return Err(Error::validation_field("id", "record has not been created"));
        }
        self.update(record.id(), &Changes::from_record(record)?).await
    }

    /// Applies several change sets in one call.
    pub async fn update_many(&self, updates: &[(RecordId, Changes)]) -> Result<BatchOutcome<E>> {
        let backend = updates
            .iter()
            .map(|(id, changes)| {
                let mut map = fields::to_backend(E::FIELDS, changes.as_map(), FieldSelection::Update);
                map.insert("Id".to_string(), Value::from(id.get()));
                map
            })
            .collect();
        tracing::debug!(entity = %E::KIND, count = updates.len(), "update");
        let response = self
            .api
            .update_record(E::TABLE, &RecordsPayload::new(backend))
            .await?;
        self.collect_outcome(response)
    }

    /// Deletes one record.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        let outcome = self.delete_many(&[id]).await?;
        if outcome.succeeded.is_empty() {
            return Err(Error::Rejected {
                entity: E::KIND.name().to_string(),
                failures: outcome.failed,
            });
        }
        Ok(())
    }

    /// Deletes several records; `succeeded` lists the ids removed.
    pub async fn delete_many(&self, ids: &[RecordId]) -> Result<BatchOutcome<RecordId>> {
        tracing::debug!(entity = %E::KIND, count = ids.len(), "delete");
        let results = self
            .api
            .delete_record(E::TABLE, &DeleteParams::new(ids.to_vec()))
            .await?
            .into_results()?;

        let mut outcome = BatchOutcome::default();
        for (id, result) in ids.iter().zip(results.iter()) {
            if result.success {
                outcome.succeeded.push(*id);
            } else {
                outcome.failed.push(result.to_failure());
            }
        }
        // Ids without a matching result were not confirmed.
        for _ in results.len()..ids.len() {
            outcome
                .failed
                .push(RecordFailure::with_message("no result returned for record"));
        }
        self.log_failures(&outcome);
        Ok(outcome)
    }

    fn collect_outcome(&self, response: ApiResponse) -> Result<BatchOutcome<E>> {
        let results = response.into_results()?;
        let mut outcome = BatchOutcome::default();
        for result in results {
            match result {
                RecordResult {
                    success: true,
                    data: Some(data),
                    ..
                } => match E::from_backend(&data) {
                    Ok(record) => outcome.succeeded.push(record),
                    Err(err) => {
                        tracing::warn!(
                            entity = %E::KIND,
                            error = %err,
                            "unreadable echo, counting record as accepted without data"
                        );
                        outcome.silent += 1;
                    }
                },
                RecordResult { success: true, .. } => outcome.silent += 1,
                failed => outcome.failed.push(failed.to_failure()),
            }
        }
        self.log_failures(&outcome);
        Ok(outcome)
    }

    fn log_failures<T>(&self, outcome: &BatchOutcome<T>) {
        if !outcome.failed.is_empty() {
            tracing::warn!(
                entity = %E::KIND,
                failed = outcome.failed.len(),
                accepted = outcome.accepted(),
                "backend refused records"
            );
        }
    }
}

impl Gateway<Deal> {
    /// Moves a deal to `stage`.
    pub async fn update_stage(&self, id: RecordId, stage: &str) -> Result<Option<Deal>> {
        self.update(id, &Changes::new().set("stage", stage)).await
    }

    /// Deals whose primary contact is `contact`.
    pub async fn list_for_contact(&self, contact: RecordId) -> Result<Vec<Deal>> {
        self.list(&ListFilter::all().with_equal("contact_id_c", contact.get()))
            .await
    }
}

impl Gateway<Activity> {
    /// Activities involving `contact`, newest first.
    pub async fn list_for_contact(&self, contact: RecordId) -> Result<Vec<Activity>> {
        self.list(&ListFilter::all().with_equal("contact_id_c", contact.get()))
            .await
    }

    /// Activities involving `deal`, newest first.
    pub async fn list_for_deal(&self, deal: RecordId) -> Result<Vec<Activity>> {
        self.list(&ListFilter::all().with_equal("deal_id_c", deal.get()))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pipelinehub_client::{MemoryRecordApi, Operation};
    use pipelinehub_core::records::{Contact, PipelineStage};
    use pipelinehub_core::{EntityKind, FieldSpec};
    use serde_json::json;

    fn record(value: Value) -> BackendRecord {
        value.as_object().cloned().unwrap()
    }

    #[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
    #[serde(default)]
    struct Counter {
        id: RecordId,
        count: u8,
    }

    impl Entity for Counter {
        const KIND: EntityKind = EntityKind::Task;
        const TABLE: &'static str = "counter_c";
        const FIELDS: &'static [FieldSpec] = &[
            FieldSpec::integer("id", "Id").read_only(),
            FieldSpec::integer("count", "count_c"),
        ];

        fn id(&self) -> RecordId {
            self.id
        }
    }

    fn setup() -> (Arc<MemoryRecordApi>, Gateway<Deal>) {
        let api = Arc::new(MemoryRecordApi::new());
        let gateway = Gateway::new(api.clone() as Arc<dyn RecordApi>);
        (api, gateway)
    }

    #[tokio::test]
    async fn test_create_returns_mapped_record() {
        let (_api, deals) = setup();
        let created = deals
            .create(&Deal::new("Renewal", 250.0).for_contact(4))
            .await
            .unwrap()
            .unwrap();
        assert!(created.id.is_assigned());
        assert_eq!(created.stage, "Lead");
        assert_eq!(created.probability, Some(10));
        assert_eq!(created.contact_id.unwrap().id, RecordId::new(4));
    }

    #[tokio::test]
    async fn test_create_validates_before_sending() {
        let (api, deals) = setup();
        let err = deals.create(&Deal::new("", 250.0).for_contact(4)).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(api.call_count(Operation::Create).await, 0);
    }

    #[tokio::test]
    async fn test_create_failure_is_api_error() {
        let (api, deals) = setup();
        api.fail_next(Operation::Create, "Quota exceeded").await;
        let err = deals
            .create(&Deal::new("Renewal", 1.0).for_contact(1))
            .await
            .unwrap_err();
        assert_eq!(err.user_messages(), vec!["Quota exceeded"]);
    }

    #[tokio::test]
    async fn test_rejected_record_reports_field_errors() {
        let (api, deals) = setup();
        api.require_fields(Deal::TABLE, &["notes_c"]).await;
        let err = deals
            .create(&Deal::new("Renewal", 1.0).for_contact(1))
            .await
            .unwrap_err();
        assert_eq!(
            err.user_messages(),
            vec!["notes_c: is required", "Required fields missing"]
        );
    }

    #[tokio::test]
    async fn test_list_uses_default_order_and_search() {
        let (api, deals) = setup();
        api.seed(
            Deal::TABLE,
            vec![
                record(json!({"title_c": "Alpha", "stage_c": "Won"})),
                record(json!({"title_c": "Beta", "stage_c": "Lead"})),
                record(json!({"title_c": "alpha two", "stage_c": "Lead"})),
            ],
        )
        .await;

        let all = deals.list(&ListFilter::all()).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha two", "Beta", "Alpha"]);

        let found = deals.list(&ListFilter::search("ALPHA")).await.unwrap();
        assert_eq!(found.len(), 2);

        let won = deals.list(&ListFilter::all().with_status("Won")).await.unwrap();
        assert_eq!(won.len(), 1);
    }

    #[tokio::test]
    async fn test_status_filter_requires_status_field() {
        let api: Arc<dyn RecordApi> = Arc::new(MemoryRecordApi::new());
        let contacts = Gateway::<Contact>::new(api);
        let err = contacts.list(&ListFilter::all().with_status("x")).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_stages_list_in_board_order() {
        let api = Arc::new(MemoryRecordApi::new());
        api.seed(
            PipelineStage::TABLE,
            vec![
                record(json!({"Name": "Won", "order_c": 3})),
                record(json!({"Name": "Lead", "order_c": 1})),
                record(json!({"Name": "Proposal", "order_c": 2})),
            ],
        )
        .await;
        let stages = Gateway::<PipelineStage>::new(api as Arc<dyn RecordApi>);
        let names: Vec<String> = stages
            .list(&ListFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Lead", "Proposal", "Won"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_api, deals) = setup();
        let err = deals.get(RecordId::new(5)).await.unwrap_err();
        assert_eq!(err.to_string(), "deal not found: 5");
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let (api, deals) = setup();
        let ids = api
            .seed(Deal::TABLE, vec![record(json!({"title_c": "A", "notes_c": "keep"}))])
            .await;
        let updated = deals.update_stage(ids[0], "Won").await.unwrap().unwrap();
        assert_eq!(updated.stage, "Won");
        assert_eq!(updated.notes.as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn test_update_record_requires_identity() {
        let (_api, deals) = setup();
        let err = deals
            .update_record(&Deal::new("A", 5.0).for_contact(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_silent_update_returns_none() {
        let (api, deals) = setup();
        let ids = api.seed(Deal::TABLE, vec![record(json!({"title_c": "A"}))]).await;
        api.set_echo_writes(false).await;
        assert!(deals.update_stage(ids[0], "Won").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_and_delete_many() {
        let (api, deals) = setup();
        let ids = api
            .seed(
                Deal::TABLE,
                vec![record(json!({"title_c": "A"})), record(json!({"title_c": "B"}))],
            )
            .await;
        deals.delete(ids[0]).await.unwrap();

        let outcome = deals.delete_many(&[ids[1], RecordId::new(99)]).await.unwrap();
        assert_eq!(outcome.succeeded, vec![ids[1]]);
        assert_eq!(outcome.failure_messages(), vec!["Record not found"]);

        let err = deals.delete(ids[0]).await.unwrap_err();
        assert!(matches!(err, Error::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_create_many_partial_failure() {
        let (api, deals) = setup();
        api.require_fields(Deal::TABLE, &["notes_c"]).await;
        let with_notes = Deal {
            notes: Some("n".to_string()),
            ..Deal::new("A", 1.0).for_contact(1)
        };
        let outcome = deals
            .create_many(&[with_notes, Deal::new("B", 1.0).for_contact(1)])
            .await
            .unwrap();
        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn test_related_queries() {
        let api = Arc::new(MemoryRecordApi::new());
        api.seed(
            Activity::TABLE,
            vec![
                record(json!({"type_c": "call", "contact_id_c": 1, "deal_id_c": 7, "timestamp_c": "2024-01-01T00:00:00Z"})),
                record(json!({"type_c": "email", "contact_id_c": 2, "timestamp_c": "2024-01-03T00:00:00Z"})),
                record(json!({"type_c": "note", "contact_id_c": 1, "timestamp_c": "2024-01-02T00:00:00Z"})),
            ],
        )
        .await;
        let activities = Gateway::<Activity>::new(api as Arc<dyn RecordApi>);

        let for_contact = activities.list_for_contact(RecordId::new(1)).await.unwrap();
        let kinds: Vec<&str> = for_contact.iter().map(|a| a.activity_type.as_str()).collect();
        assert_eq!(kinds, vec!["note", "call"]);

        let for_deal = activities.list_for_deal(RecordId::new(7)).await.unwrap();
        assert_eq!(for_deal.len(), 1);
    }

    #[test]
    fn test_unreadable_echo_counts_as_silent() {
        let counters = Gateway::<Counter>::new(Arc::new(MemoryRecordApi::new()) as Arc<dyn RecordApi>);
        let response = ApiResponse::with_results(vec![
            RecordResult::ok(Some(record(json!({"Id": 1, "count_c": 7})))),
            RecordResult::ok(Some(record(json!({"Id": 2, "count_c": 1000})))),
            RecordResult::failed("Locked", Vec::new()),
        ]);

        let outcome = counters.collect_outcome(response).unwrap();
        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.succeeded[0].count, 7);
        assert_eq!(outcome.silent, 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.accepted(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_single_echo_is_not_an_error() {
        let api = Arc::new(MemoryRecordApi::new());
        let ids = api
            .seed(Counter::TABLE, vec![record(json!({"count_c": 1000}))])
            .await;
        let counters = Gateway::<Counter>::new(api.clone() as Arc<dyn RecordApi>);

        let echoed = counters.update(ids[0], &Changes::new()).await.unwrap();
        assert!(echoed.is_none());
    }
}
