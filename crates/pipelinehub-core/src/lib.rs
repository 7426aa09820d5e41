#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! PipelineHub Core
//!
//! Entity records, field-mapping tables, and the error taxonomy shared by the
//! client, store, and view crates. It has no internal dependencies.

pub mod entity;
pub mod error;
pub mod fields;
pub mod ids;
pub mod records;
pub mod validate;

mod proptests;

// Re-exports for convenience
pub use entity::{DefaultOrder, Entity, EntityKind};
pub use error::{Error, FieldError, RecordFailure, Result};
pub use fields::{Changes, FieldDefault, FieldKind, FieldSelection, FieldSpec};
pub use ids::{Lookup, RecordId};
pub use records::{Activity, Company, Contact, Deal, PipelineStage, Quote, SalesOrder, Task};
