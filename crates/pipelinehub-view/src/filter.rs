//! Free-text search and categorical facets.
//!
//! A [`Filter`] is a conjunction: the search text must appear (ignoring
//! case) in at least one of the record's search fields, and every facet
//! value must equal one of the record's values for that facet. Blank values
//! and `"all"` match everything.

use pipelinehub_core::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::sort::SortValue;

/// A categorical dropdown filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Facet {
    /// Workflow status
    Status,
    /// Company industry
    Industry,
    /// Any one of the record's tags
    Tag,
    /// Deal stage
    Stage,
    /// Deal or task priority
    Priority,
    /// Activity type, compared without case
    ActivityType,
}

impl Facet {
    /// Every facet.
    pub const ALL: [Facet; 6] = [
        Facet::Status,
        Facet::Industry,
        Facet::Tag,
        Facet::Stage,
        Facet::Priority,
        Facet::ActivityType,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Facet::Status => "status",
            Facet::Industry => "industry",
            Facet::Tag => "tag",
            Facet::Stage => "stage",
            Facet::Priority => "priority",
            Facet::ActivityType => "type",
        }
    }

    fn ignores_case(self) -> bool {
        matches!(self, Facet::ActivityType)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "status" => Ok(Facet::Status),
            "industry" => Ok(Facet::Industry),
            "tag" | "tags" => Ok(Facet::Tag),
            "stage" => Ok(Facet::Stage),
            "priority" => Ok(Facet::Priority),
            "type" | "activity-type" | "activity_type" => Ok(Facet::ActivityType),
            _ => Err(Error::validation_field(
                "filter",
                format!("unknown facet '{s}'"),
            )),
        }
    }
}

/// A record that can be searched, faceted and sorted.
pub trait Viewable {
    /// Facets this record supports.
    const FACETS: &'static [Facet];

    /// Keys accepted by [`sort_value`](Viewable::sort_value).
    const SORT_KEYS: &'static [&'static str];

    /// Text searched by free-text queries.
    fn search_fields(&self) -> Vec<&str>;

    /// Values of `facet` for this record; empty when the record has none.
    fn facet_values(&self, facet: Facet) -> Vec<&str>;

    /// Sort value under `key`, or `None` for an unknown key.
    fn sort_value(&self, key: &str) -> Option<SortValue>;
}

impl<T: Viewable + ?Sized> Viewable for &T {
    const FACETS: &'static [Facet] = T::FACETS;
    const SORT_KEYS: &'static [&'static str] = T::SORT_KEYS;

    fn search_fields(&self) -> Vec<&str> {
        (**self).search_fields()
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        (**self).facet_values(facet)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        (**self).sort_value(key)
    }
}

/// Search text plus facet constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    search: String,
    facets: Vec<(Facet, String)>,
}

fn matches_all(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

impl Filter {
    /// A filter matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query.
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    /// Adds a facet constraint.
    pub fn facet(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.facets.push((facet, value.into()));
        self
    }

    /// The free-text query.
    pub fn query(&self) -> &str {
        &self.search
    }

    /// Facet constraints in insertion order.
    pub fn facets(&self) -> &[(Facet, String)] {
        &self.facets
    }

    /// Returns `true` if the filter matches every record.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.facets.iter().all(|(_, v)| matches_all(v))
    }

    /// Fails if a constrained facet is not supported by `T`.
    pub fn check<T: Viewable>(&self) -> Result<()> {
        for (facet, _) in &self.facets {
            if !T::FACETS.contains(facet) {
                let supported: Vec<&str> = T::FACETS.iter().map(|f| f.name()).collect();
                return Err(Error::validation_field(
                    "filter",
                    format!(
                        "facet '{facet}' is not supported here; expected one of [{}]",
                        supported.join(", ")
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Returns `true` if `item` satisfies every constraint.
    pub fn matches<T: Viewable>(&self, item: &T) -> bool {
        self.matches_search(item) && self.facets.iter().all(|(f, v)| matches_facet(item, *f, v))
    }

    fn matches_search<T: Viewable>(&self, item: &T) -> bool {
        let needle = self.search.trim();
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        item.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

fn matches_facet<T: Viewable>(item: &T, facet: Facet, wanted: &str) -> bool {
    if matches_all(wanted) {
        return true;
    }
    item.facet_values(facet).iter().any(|value| {
        if facet.ignores_case() {
            value.to_lowercase() == wanted.to_lowercase()
        } else {
            *value == wanted
        }
    })
}

/// Records of `items` matching `filter`, in input order.
pub fn filter<'a, T: Viewable>(items: &'a [T], filter: &Filter) -> Vec<&'a T> {
    items.iter().filter(|item| filter.matches(*item)).collect()
}

// ============================================================================
// Tests
// ============================================================================
