//! Integration test suite for PipelineHub stores.
//!
//! Drives the stores against the in-memory record API, covering list
//! reconciliation, superseded loads, and per-record batch notifications.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
mod integration;
