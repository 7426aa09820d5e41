//! HTTP implementation of [`RecordApi`].

use async_trait::async_trait;
use pipelinehub_core::{RecordId, Result};
use serde::Serialize;

use crate::api::RecordApi;
use crate::config::ApiConfig;
use crate::error::Error;
use crate::wire::{ApiResponse, DeleteParams, FetchQuery, RecordsPayload};

/// Header carrying the project identifier.
pub const PROJECT_HEADER: &str = "X-Project-Id";

const MAX_ERROR_BODY: usize = 512;

/// Record API client posting JSON to
/// `{base_url}/tables/{table}/records/{operation}`.
#[derive(Debug, Clone)]
pub struct HttpRecordApi {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    public_key: String,
}

impl HttpRecordApi {
    /// Builds a client from configuration.
    pub fn new(config: &ApiConfig) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            public_key: config.public_key.clone(),
        })
    }

    /// Endpoint URL of `operation` on `table`.
    pub fn endpoint(&self, table: &str, operation: &str) -> String {
        format!("{}/tables/{table}/records/{operation}", self.base_url)
    }

    async fn post<B: Serialize + Sync>(&self, url: String, body: &B) -> Result<ApiResponse> {
        tracing::debug!(%url, "record API request");
        let mut request = self.client.post(&url).json(body);
        if !self.project_id.is_empty() {
            request = request.header(PROJECT_HEADER, &self.project_id);
        }
        if !self.public_key.is_empty() {
            request = request.bearer_auth(&self.public_key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "record API request failed");
            Error::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        // Failures usually still carry the API envelope; prefer its message.
        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => {
                let mut body = body;
                body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
                Err(Error::Status {
                    status: status.as_u16(),
                    body,
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

#[async_trait]
impl RecordApi for HttpRecordApi {
    async fn fetch_records(&self, table: &str, query: &FetchQuery) -> Result<ApiResponse> {
        self.post(self.endpoint(table, "fetch"), query).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        query: &FetchQuery,
    ) -> Result<ApiResponse> {
        self.post(self.endpoint(table, &format!("get/{id}")), query)
            .await
    }

    async fn create_record(&self, table: &str, payload: &RecordsPayload) -> Result<ApiResponse> {
        self.post(self.endpoint(table, "create"), payload).await
    }

    async fn update_record(&self, table: &str, payload: &RecordsPayload) -> Result<ApiResponse> {
        self.post(self.endpoint(table, "update"), payload).await
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<ApiResponse> {
        self.post(self.endpoint(table, "delete"), params).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// Tests
// ============================================================================
