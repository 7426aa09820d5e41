//! Pipeline board and deal summary.

use chrono::{DateTime, Duration, Utc};
use pipelinehub_core::records::{Deal, PipelineStage, STAGE_WON};
use serde::Serialize;

use crate::aggregate::{GroupStats, sum_by};
use crate::sort::{Direction, SortValue, sort_by_value};
use crate::time::{parse_timestamp, start_of_day};

/// Priority marking a deal as high priority.
pub const PRIORITY_HIGH: &str = "High";

/// Days ahead counted as "closing soon".
pub const CLOSING_WINDOW_DAYS: i64 = 7;

/// One column of the pipeline board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageColumn<'a> {
    /// Stage name
    pub stage: &'a str,
    /// Display color of the stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'a str>,
    /// Deals in the stage, in list order
    pub deals: Vec<&'a Deal>,
    /// Deal count and value total
    pub stats: GroupStats,
}

/// Board columns in stage order.
///
/// Deals whose stage matches no column are not shown.
pub fn pipeline_board<'a>(stages: &'a [PipelineStage], deals: &'a [Deal]) -> Vec<StageColumn<'a>> {
    let mut ordered: Vec<&PipelineStage> = stages.iter().collect();
    sort_by_value(&mut ordered, Direction::Asc, |s| SortValue::integer(Some(s.order)));
    ordered
        .into_iter()
        .map(|stage| {
            let in_stage: Vec<&Deal> = deals.iter().filter(|d| d.stage == stage.name).collect();
            let stats = GroupStats::new(in_stage.len(), sum_by(&in_stage, |d| d.value));
            StageColumn {
                stage: &stage.name,
                color: stage.color.as_deref(),
                deals: in_stage,
                stats,
            }
        })
        .collect()
}

/// Likelihood band of a deal's probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbabilityBand {
    /// 80% and above
    High,
    /// 50% to 79%
    Medium,
    /// Below 50%, or unknown
    Low,
}

impl ProbabilityBand {
    /// Band of `probability`.
    pub fn of(probability: Option<i64>) -> Self {
        match probability {
            Some(p) if p >= 80 => ProbabilityBand::High,
            Some(p) if p >= 50 => ProbabilityBand::Medium,
            _ => ProbabilityBand::Low,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ProbabilityBand::High => "high",
            ProbabilityBand::Medium => "medium",
            ProbabilityBand::Low => "low",
        }
    }
}

/// Headline numbers of the pipeline and dashboard pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PipelineSummary {
    /// Value of deals neither won nor lost
    pub open_value: f64,
    /// Value of won deals
    pub won_value: f64,
    /// Deals neither won nor lost
    pub active_deals: usize,
    /// Open deals with high priority
    pub open_high_priority: usize,
    /// Open deals expected to close within the next week
    pub closing_soon: usize,
}

/// Open deals with high priority, in list order.
pub fn high_priority_open(deals: &[Deal]) -> Vec<&Deal> {
    deals
        .iter()
        .filter(|d| d.is_open() && d.priority == PRIORITY_HIGH)
        .collect()
}

/// Open deals expected to close between today and a week from `now`.
pub fn closing_soon(deals: &[Deal], now: DateTime<Utc>) -> Vec<&Deal> {
    let from = start_of_day(now);
    let until = now + Duration::days(CLOSING_WINDOW_DAYS);
    deals
        .iter()
        .filter(|d| d.is_open())
        .filter(|d| {
            d.expected_close_date
                .as_deref()
                .and_then(parse_timestamp)
                .is_some_and(|close| close >= from && close <= until)
        })
        .collect()
}

/// Summarizes `deals` as of `now`.
pub fn pipeline_summary(deals: &[Deal], now: DateTime<Utc>) -> PipelineSummary {
    let open: Vec<&Deal> = deals.iter().filter(|d| d.is_open()).collect();
    PipelineSummary {
        open_value: sum_by(&open, |d| d.value),
        won_value: sum_by(deals.iter().filter(|d| d.stage == STAGE_WON), |d| d.value),
        active_deals: open.len(),
        open_high_priority: high_priority_open(deals).len(),
        closing_soon: closing_soon(deals, now).len(),
    }
}
