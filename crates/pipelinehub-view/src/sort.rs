//! Single-key stable sorting.
//!
//! Every sort key yields a [`SortValue`] of one of three classes: numbers
//! (unparsable values count as zero), dates (unparsable values sort as the
//! Unix epoch) and case-folded text. Lookups sort by the referenced name.

use pipelinehub_core::{Error, Lookup, Result};
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use crate::filter::Viewable;
use crate::time::parse_timestamp;

/// Milliseconds assigned to missing or unparsable dates.
pub const EPOCH_SENTINEL: i64 = 0;

/// A comparable value extracted from a record.
#[derive(Debug, Clone, Serialize)]
pub enum SortValue {
    /// Numeric value
    Number(f64),
    /// Milliseconds since the Unix epoch
    Date(i64),
    /// Lowercased text
    Text(String),
}

impl SortValue {
    /// A number, with `None` counting as zero.
    pub fn number(value: Option<f64>) -> Self {
        SortValue::Number(value.filter(|v| !v.is_nan()).unwrap_or(0.0))
    }

    /// An integer, with `None` counting as zero.
    pub fn integer(value: Option<i64>) -> Self {
        SortValue::Number(value.unwrap_or(0) as f64)
    }

    /// A date parsed from text; unparsable dates become the epoch.
    pub fn date(text: Option<&str>) -> Self {
        let millis = text
            .and_then(parse_timestamp)
            .map(|t| t.timestamp_millis())
            .unwrap_or(EPOCH_SENTINEL);
        SortValue::Date(millis)
    }

    /// Case-folded text, with `None` as the empty string.
    pub fn text(text: Option<&str>) -> Self {
        SortValue::Text(text.unwrap_or("").to_lowercase())
    }

    /// The referenced record's name.
    pub fn lookup(lookup: Option<&Lookup>) -> Self {
        Self::text(lookup.map(Lookup::name_or_empty))
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Number(_) => 0,
            SortValue::Date(_) => 1,
            SortValue::Text(_) => 2,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl Direction {
    /// The other direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            _ => Err(Error::validation_field(
                "direction",
                format!("expected 'asc' or 'desc', got '{s}'"),
            )),
        }
    }
}

/// A sort key and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    /// Sort key, a UI field name
    pub key: String,
    /// Direction
    pub direction: Direction,
}

impl SortSpec {
    /// Ascending by `key`.
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending by `key`.
    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Direction::Desc,
        }
    }

    /// Same key, other direction.
    pub fn reversed(&self) -> Self {
        Self {
            key: self.key.clone(),
            direction: self.direction.reversed(),
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Asc => write!(f, "{} asc", self.key),
            Direction::Desc => write!(f, "{} desc", self.key),
        }
    }
}

/// Stable sort of `items` by the value `key` extracts.
///
/// Items with equal values keep their input order in both directions.
pub fn sort_by_value<T, F>(items: &mut [T], direction: Direction, key: F)
where
    F: Fn(&T) -> SortValue,
{
    match direction {
        Direction::Asc => items.sort_by_cached_key(|item| key(item)),
        Direction::Desc => items.sort_by_cached_key(|item| Reverse(key(item))),
    }
}

/// Stable sort of `items` by one of `T::SORT_KEYS`.
pub fn sort<T: Viewable>(items: &mut [T], spec: &SortSpec) -> Result<()> {
    if !T::SORT_KEYS.contains(&spec.key.as_str()) {
        return Err(unknown_key(&spec.key, T::SORT_KEYS));
    }
    sort_by_value(items, spec.direction, |item| {
        item.sort_value(&spec.key)
            .unwrap_or_else(|| SortValue::text(None))
    });
    Ok(())
}

pub(crate) fn unknown_key(key: &str, known: &[&str]) -> Error {
    Error::validation_field(
        "sort",
        format!("unknown sort key '{key}'; expected one of [{}]", known.join(", ")),
    )
}

// ============================================================================
// Tests
// ============================================================================
