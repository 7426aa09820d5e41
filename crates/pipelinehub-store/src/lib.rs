#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! PipelineHub Store
//!
//! Gateways issue CRUD calls and return uniform results; stores hold the
//! loaded lists, reconcile them after mutations, and turn failures into
//! transient notices.

pub mod crm;
pub mod gateway;
pub mod notify;
pub mod store;

// Re-exports for convenience
pub use crm::{Crm, CrmBuilder};
pub use gateway::{BatchOutcome, Gateway, ListFilter};
pub use notify::{CollectingNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use store::{RecordStore, Snapshot};
