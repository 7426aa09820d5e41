//! Derived views behind each page.
//!
//! Quotes, sales orders and tasks need nothing beyond [`table_view`] and
//! [`distinct_facet_values`]; the other pages have their own modules.

use pipelinehub_core::{EntityKind, Result};
use serde::Serialize;

use crate::aggregate::distinct_sorted;
use crate::filter::{Facet, Filter, Viewable, filter};
use crate::sort::{SortSpec, sort};

pub mod activities;
pub mod companies;
pub mod contacts;
pub mod pipeline;

/// Rows shown in a table, plus the size of the unfiltered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView<T> {
    /// Filtered, sorted rows
    pub rows: Vec<T>,
    /// Number of records before filtering
    pub total: usize,
}

impl<T> TableView<T> {
    /// Number of rows shown.
    pub fn shown(&self) -> usize {
        self.rows.len()
    }

    /// "Showing X of Y {noun}".
    pub fn summary(&self, noun: &str) -> String {
        format!("Showing {} of {} {noun}", self.shown(), self.total)
    }
}

/// Filter and sort state of a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    /// Search and facets
    pub filter: Filter,
    /// Sort key; `None` keeps list order
    pub sort: Option<SortSpec>,
}

impl TableQuery {
    /// Unfiltered, unsorted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the sort.
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Filters then sorts `items`.
pub fn table_view<'a, T: Viewable>(items: &'a [T], query: &TableQuery) -> Result<TableView<&'a T>> {
    query.filter.check::<T>()?;
    let mut rows = filter(items, &query.filter);
    if let Some(spec) = &query.sort {
        sort(&mut rows, spec)?;
    }
    Ok(TableView {
        rows,
        total: items.len(),
    })
}

/// Sorted distinct values of `facet` across `items`, for dropdowns.
pub fn distinct_facet_values<T: Viewable>(items: &[T], facet: Facet) -> Vec<String> {
    distinct_sorted(items.iter().flat_map(|item| item.facet_values(facet)))
}

/// Initial sort of each entity's table.
pub fn default_sort(kind: EntityKind) -> Option<SortSpec> {
    match kind {
        EntityKind::Contact | EntityKind::Company | EntityKind::SalesOrder => {
            Some(SortSpec::desc("updatedAt"))
        }
        EntityKind::Quote => Some(SortSpec::desc("createdAt")),
        EntityKind::Activity => Some(SortSpec::desc("timestamp")),
        EntityKind::PipelineStage => Some(SortSpec::asc("order")),
        EntityKind::Deal | EntityKind::Task => None,
    }
}
