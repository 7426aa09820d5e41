//! Activity feed, weekly statistics and recent activity.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use pipelinehub_core::records::Activity;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{count_by, count_by_day, week_over_week};
use crate::filter::{Facet, Filter, filter};
use crate::pages::TableView;
use crate::sort::{Direction, SortValue, sort_by_value};
use crate::time::{TimeWindow, parse_timestamp, start_of_week};

/// Filter state of the activity feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Activity type; blank or "all" matches every type
    pub activity_type: String,
    /// Time window
    pub window: TimeWindow,
}

impl ActivityQuery {
    /// Every activity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one activity type.
    pub fn of_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = activity_type.into();
        self
    }

    /// Restricts to a time window.
    pub fn within(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }
}

/// Activities matching `query` as of `now`, in list order.
pub fn activities_view<'a>(
    activities: &'a [Activity],
    query: &ActivityQuery,
    now: DateTime<Utc>,
) -> TableView<&'a Activity> {
    let by_type = Filter::new().facet(Facet::ActivityType, query.activity_type.as_str());
    let rows = filter(activities, &by_type)
        .into_iter()
        .filter(|a| query.window.contains(a.occurred_at(), now))
        .collect();
    TableView {
        rows,
        total: activities.len(),
    }
}

/// Weekly activity statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityStats {
    /// Activities since the start of this week
    pub this_week: usize,
    /// Activities during the previous week
    pub last_week: usize,
    /// Percentage change from last week to this week
    pub week_change: i64,
    /// Count per activity type
    pub by_type: BTreeMap<String, usize>,
}

/// Computes [`ActivityStats`] as of `now`.
pub fn activity_stats(activities: &[Activity], now: DateTime<Utc>) -> ActivityStats {
    let this_week_start = start_of_week(now);
    let last_week_start = this_week_start - Duration::days(7);

    let mut this_week = 0;
    let mut last_week = 0;
    for at in activities.iter().filter_map(|a| a.occurred_at().and_then(parse_timestamp)) {
        if at >= this_week_start {
            this_week += 1;
        } else if at >= last_week_start {
            last_week += 1;
        }
    }

    ActivityStats {
        this_week,
        last_week,
        week_change: week_over_week(this_week, last_week),
        by_type: count_by(activities, |a| a.activity_type.clone()),
    }
}

/// The `limit` most recent activities, newest first.
pub fn recent(activities: &[Activity], limit: usize) -> Vec<&Activity> {
    let mut rows: Vec<&Activity> = activities.iter().collect();
    sort_by_value(&mut rows, Direction::Desc, |a| SortValue::date(a.occurred_at()));
    rows.truncate(limit);
    rows
}

/// Activity count per calendar day.
pub fn activity_days(activities: &[Activity]) -> BTreeMap<NaiveDate, usize> {
    count_by_day(activities, |a| a.occurred_at().and_then(parse_timestamp))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        // Wednesday; the week started on Sunday 2024-04-28.
        parse_timestamp("2024-05-01T15:00:00Z").unwrap()
    }

    fn feed() -> Vec<Activity> {
        vec![
            Activity::new("Call", "today", "2024-05-01T09:00:00Z"),
            Activity::new("Email", "monday", "2024-04-29T09:00:00Z"),
            Activity::new("call", "last week", "2024-04-23T09:00:00Z"),
            Activity::new("Meeting", "last month", "2024-03-20T09:00:00Z"),
        ]
    }

    #[test]
    fn test_type_and_window_combine() {
        let feed = feed();
        let query = ActivityQuery::new().of_type("CALL").within(TimeWindow::ThisMonth);
        let view = activities_view(&feed, &query, now());
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].description, "today");
        assert_eq!(view.summary("activities"), "Showing 1 of 4 activities");
    }

    #[test]
    fn test_all_types_this_week() {
        let feed = feed();
        let view = activities_view(&feed, &ActivityQuery::new().within(TimeWindow::ThisWeek), now());
        let descriptions: Vec<&str> = view.rows.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(descriptions, vec!["today", "monday"]);
    }

    #[test]
    fn test_weekly_stats() {
        let stats = activity_stats(&feed(), now());
        assert_eq!(stats.this_week, 2);
        assert_eq!(stats.last_week, 1);
        assert_eq!(stats.week_change, 100);
        assert_eq!(stats.by_type.get("Call"), Some(&1));
        assert_eq!(stats.by_type.get("call"), Some(&1));
    }

    #[test]
    fn test_stats_with_no_prior_week() {
        let feed = vec![Activity::new("Call", "today", "2024-05-01T09:00:00Z")];
        let stats = activity_stats(&feed, now());
        assert_eq!(stats.last_week, 0);
        assert_eq!(stats.week_change, 100);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let feed = feed();
        let rows = recent(&feed, 2);
        let descriptions: Vec<&str> = rows.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(descriptions, vec!["today", "monday"]);
        assert_eq!(recent(&feed, 10).len(), 4);
    }

    #[test]
    fn test_activity_days() {
        let days = activity_days(&feed());
        assert_eq!(days.len(), 4);
        assert!(days.values().all(|count| *count == 1));
    }
}
