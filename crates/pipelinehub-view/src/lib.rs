#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! PipelineHub View
//!
//! Filter, sort, group and aggregate over record lists held by the stores.
//! Every function takes slices and returns borrowed rows, so a view can be
//! recomputed on each change without copying records.

pub mod aggregate;
pub mod filter;
pub mod pages;
pub mod records;
pub mod sort;
pub mod time;

mod proptests;

// Re-exports for convenience
pub use aggregate::{GroupStats, count_by, distinct_sorted, group_by, sum_by, week_over_week};
pub use filter::{Facet, Filter, Viewable, filter};
pub use pages::{TableQuery, TableView, default_sort, distinct_facet_values, table_view};
pub use sort::{Direction, SortSpec, SortValue, sort, sort_by_value};
pub use time::{TimeWindow, parse_timestamp, start_of_week};
