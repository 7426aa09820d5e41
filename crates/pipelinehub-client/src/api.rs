//! Record API trait and factory.
//!
//! # Backends
//!
//! - `HttpRecordApi`: the remote record service over HTTPS
//! - `MemoryRecordApi`: an in-process table store, used in tests and when no
//!   base URL is configured
//!
//! # Example
//!
//! ```rust,ignore
//! use pipelinehub_client::{create_record_api, CrmConfig, FetchQuery};
//!
//! let config = CrmConfig::load(None)?;
//! let api = create_record_api(&config.api)?;
//! let response = api.fetch_records("deal_c", &FetchQuery::select(["title_c"])).await?;
//! ```

use async_trait::async_trait;
use pipelinehub_core::{RecordId, Result};
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::http::HttpRecordApi;
use crate::memory::MemoryRecordApi;
use crate::wire::{ApiResponse, DeleteParams, FetchQuery, RecordsPayload};

/// Abstract record API.
///
/// Every method resolves to the raw response envelope; `Err` is reserved
/// for calls that never produced one (transport, decoding).
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Lists records of `table`.
    async fn fetch_records(&self, table: &str, query: &FetchQuery) -> Result<ApiResponse>;

    /// Fetches one record of `table`.
    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        query: &FetchQuery,
    ) -> Result<ApiResponse>;

    /// Creates records; `results` holds one outcome per submitted record.
    async fn create_record(&self, table: &str, payload: &RecordsPayload) -> Result<ApiResponse>;

    /// Updates records identified by their `Id` field.
    async fn update_record(&self, table: &str, payload: &RecordsPayload) -> Result<ApiResponse>;

    /// Deletes records by id.
    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<ApiResponse>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Creates a record API from configuration.
///
/// Selection logic:
/// 1. `base_url` set → `HttpRecordApi`
/// 2. Otherwise → an empty `MemoryRecordApi`
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn create_record_api(config: &ApiConfig) -> Result<Arc<dyn RecordApi>> {
    if config.base_url.trim().is_empty() {
        tracing::warn!("no API base URL configured, using in-memory records");
        return Ok(Arc::new(MemoryRecordApi::new()));
    }
    Ok(Arc::new(HttpRecordApi::new(config)?))
}
