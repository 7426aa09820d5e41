//! Timestamp parsing and calendar windows.
//!
//! All calendar arithmetic is done in UTC. Weeks start on Sunday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use pipelinehub_core::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an RFC 3339 timestamp, a naive date-time (taken as UTC) or a
/// bare `YYYY-MM-DD` date (taken as midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Midnight at the start of `now`'s day.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Midnight at the start of the Sunday on or before `now`.
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days = i64::from(now.weekday().num_days_from_sunday());
    start_of_day(now) - Duration::days(days)
}

/// Midnight on the first day of `now`'s month.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// A time filter on activity timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeWindow {
    /// No constraint
    #[default]
    All,
    /// Same calendar day as now
    Today,
    /// On or after the start of this week
    ThisWeek,
    /// On or after the start of this month
    ThisMonth,
}

impl TimeWindow {
    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::Today => "today",
            TimeWindow::ThisWeek => "week",
            TimeWindow::ThisMonth => "month",
        }
    }

    /// Returns `true` if `timestamp` falls in the window.
    ///
    /// Missing or unparsable timestamps only fall in [`TimeWindow::All`].
    pub fn contains(self, timestamp: Option<&str>, now: DateTime<Utc>) -> bool {
        if self == TimeWindow::All {
            return true;
        }
        let Some(at) = timestamp.and_then(parse_timestamp) else {
            return false;
        };
        match self {
            TimeWindow::All => true,
            TimeWindow::Today => at.date_naive() == now.date_naive(),
            TimeWindow::ThisWeek => at >= start_of_week(now),
            TimeWindow::ThisMonth => at >= start_of_month(now),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeWindow::All),
            "today" => Ok(TimeWindow::Today),
            "week" | "this-week" => Ok(TimeWindow::ThisWeek),
            "month" | "this-month" => Ok(TimeWindow::ThisMonth),
            _ => Err(Error::validation_field(
                "window",
                format!("expected all, today, week or month, got '{s}'"),
            )),
        }
    }
}
