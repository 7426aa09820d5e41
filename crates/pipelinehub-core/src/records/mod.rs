//! Typed records, one module per entity.
//!
//! Every record serializes with camelCase UI names; absent optional fields
//! are skipped so create defaults apply.

mod activity;
mod company;
mod contact;
mod deal;
mod quote;
mod sales_order;
mod stage;
mod task;

pub use activity::Activity;
pub use company::Company;
pub use contact::Contact;
pub use deal::{Deal, STAGE_LOST, STAGE_WON};
pub use quote::Quote;
pub use sales_order::SalesOrder;
pub use stage::PipelineStage;
pub use task::Task;
