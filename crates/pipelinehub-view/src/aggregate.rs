//! Group-by reductions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Count and sum of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupStats {
    /// Number of items
    pub count: usize,
    /// Sum of the items' values
    pub sum: f64,
}

impl GroupStats {
    /// Stats of `count` items summing to `sum`.
    pub fn new(count: usize, sum: f64) -> Self {
        Self { count, sum }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }
}

/// Groups `items` by `key`, counting them and summing `value`.
pub fn group_by<I, K, FK, FV>(items: I, mut key: FK, mut value: FV) -> BTreeMap<K, GroupStats>
where
    I: IntoIterator,
    K: Ord,
    FK: FnMut(&I::Item) -> K,
    FV: FnMut(&I::Item) -> f64,
{
    let mut groups: BTreeMap<K, GroupStats> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().add(value(&item));
    }
    groups
}

/// Counts `items` per `key`.
pub fn count_by<I, K, FK>(items: I, mut key: FK) -> BTreeMap<K, usize>
where
    I: IntoIterator,
    K: Ord,
    FK: FnMut(&I::Item) -> K,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(key(&item)).or_default() += 1;
    }
    counts
}

/// Counts `items` per calendar day; items without a timestamp are skipped.
pub fn count_by_day<I, F>(items: I, mut timestamp: F) -> BTreeMap<NaiveDate, usize>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> Option<DateTime<Utc>>,
{
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for item in items {
        if let Some(at) = timestamp(&item) {
            *counts.entry(at.date_naive()).or_default() += 1;
        }
    }
    counts
}

/// Sum of `value` over `items`.
pub fn sum_by<I, FV>(items: I, value: FV) -> f64
where
    I: IntoIterator,
    FV: FnMut(I::Item) -> f64,
{
    items.into_iter().map(value).sum()
}

/// Percentage change from `prior` to `current`, rounded half up.
///
/// A prior count of zero reports +100%.
pub fn week_over_week(current: usize, prior: usize) -> i64 {
    if prior == 0 {
        return 100;
    }
    let change = (current as f64 - prior as f64) / prior as f64 * 100.0;
    (change + 0.5).floor() as i64
}

/// Distinct non-blank values, sorted.
pub fn distinct_sorted<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
