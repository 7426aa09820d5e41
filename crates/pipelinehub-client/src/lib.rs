#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! PipelineHub Client
//!
//! The `RecordApi` seam between the gateways and the remote record service,
//! with an HTTP implementation and an in-memory one.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod wire;

// Re-exports for convenience
pub use api::{RecordApi, create_record_api};
pub use config::{ApiConfig, CrmConfig, LogConfig};
pub use error::{Error, Result};
pub use http::HttpRecordApi;
pub use memory::{Call, MemoryRecordApi, Operation};
pub use wire::{
    ApiResponse, BackendRecord, DeleteParams, FetchQuery, Operator, PagingInfo, RecordResult,
    RecordsPayload, SortType, WhereClause,
};
