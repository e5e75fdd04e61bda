//! Date-range resolution
//!
//! Turns a range selection into the ordered anchors the rest of the pipeline
//! works on, oldest first.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::{AnalyticsError, AnalyticsResult};

/// Trailing window for the quarter view
pub const QUARTER_DAYS: i64 = 90;
/// Month anchors in the year view
pub const YEAR_MONTHS: u32 = 12;
/// Upper bound on a custom range
pub const MAX_CUSTOM_DAYS: usize = 365;

/// A time-range selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "3m")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "custom")]
    Custom,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "3m",
            TimeRange::Year => "1y",
            TimeRange::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "7d" | "week" => Some(TimeRange::Week),
            "30d" | "month" => Some(TimeRange::Month),
            "3m" | "90d" | "quarter" => Some(TimeRange::Quarter),
            "1y" | "year" => Some(TimeRange::Year),
            "custom" => Some(TimeRange::Custom),
            _ => None,
        }
    }

    /// Per-date lookups issued together in one batch.
    ///
    /// Tuned to the backend's latency budget, not a correctness limit.
    pub fn batch_size(&self) -> usize {
        match self {
            TimeRange::Month | TimeRange::Quarter => 30,
            TimeRange::Week | TimeRange::Year | TimeRange::Custom => 50,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            TimeRange::Year => Granularity::Month,
            _ => Granularity::Day,
        }
    }
}

/// Size of one output bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

/// A resolved range: anchors plus the concrete dates to fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    pub range: TimeRange,
    pub granularity: Granularity,
    /// Days, or the first day of each month for month granularity
    pub anchors: Vec<NaiveDate>,
    /// Last date covered (today for trailing ranges)
    pub end: Option<NaiveDate>,
}

impl ResolvedRange {
    fn empty(range: TimeRange) -> Self {
        Self {
            range,
            granularity: range.granularity(),
            anchors: Vec::new(),
            end: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.anchors.first().copied()
    }

    /// Every calendar date whose log is needed, oldest first
    pub fn fetch_dates(&self) -> Vec<NaiveDate> {
        match self.granularity {
            Granularity::Day => self.anchors.clone(),
            Granularity::Month => match (self.start(), self.end) {
                (Some(start), Some(end)) => start.iter_days().take_while(|d| *d <= end).collect(),
                _ => Vec::new(),
            },
        }
    }

    /// Number of calendar days the range spans
    pub fn span_days(&self) -> usize {
        match (self.start(), self.end) {
            (Some(start), Some(end)) if start <= end => ((end - start).num_days() + 1) as usize,
            _ => 0,
        }
    }
}

/// Resolve a range selection against `today`.
///
/// Custom bounds are ISO dates; a missing or blank bound, or a start after the
/// end, resolves to an empty range.
pub fn resolve_range(
    range: TimeRange,
    today: NaiveDate,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
) -> AnalyticsResult<ResolvedRange> {
    let anchors = match range {
        TimeRange::Week => trailing_days(today, 7),
        TimeRange::Month => trailing_days(today, 30),
        TimeRange::Quarter => trailing_days(today, QUARTER_DAYS),
        TimeRange::Year => trailing_months(today, YEAR_MONTHS),
        TimeRange::Custom => {
            let (start, end) = match (parse_bound(custom_start)?, parse_bound(custom_end)?) {
                (Some(start), Some(end)) if start <= end => (start, end),
                _ => return Ok(ResolvedRange::empty(range)),
            };
            let days: Vec<NaiveDate> = start
                .iter_days()
                .take_while(|d| *d <= end)
                .take(MAX_CUSTOM_DAYS)
                .collect();
            let end = days.last().copied();
            return Ok(ResolvedRange {
                range,
                granularity: Granularity::Day,
                anchors: days,
                end,
            });
        }
    };

    Ok(ResolvedRange {
        range,
        granularity: range.granularity(),
        anchors,
        end: Some(today),
    })
}

fn parse_bound(raw: Option<&str>) -> AnalyticsResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AnalyticsError::InvalidDate(s.to_string())),
    }
}

fn trailing_days(today: NaiveDate, count: i64) -> Vec<NaiveDate> {
    (0..count).rev().map(|i| today - Duration::days(i)).collect()
}

fn trailing_months(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let first_of_month = today - Duration::days(today.day0() as i64);
    (0..count)
        .rev()
        .filter_map(|i| first_of_month.checked_sub_months(Months::new(i)))
        .collect()
}
