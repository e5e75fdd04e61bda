//! Nutrack Status Tool
//!
//! Provides runtime status information about the Nutrack service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Analytics usage instructions for AI assistants
pub const ANALYTICS_INSTRUCTIONS: &str = r#"
# Nutrack Analytics Instructions

Nutrack turns logged meals, workouts, and day metrics into trends, goal
achievement, and correlations.

## Dates

All dates are ISO format: YYYY-MM-DD. Ranges are resolved against the
server's local date.

## Logging

- `log_meal`: name, meal_type (breakfast, lunch, dinner, snack), calories,
  protein, optional carbs and fats.
- `log_exercise`: name, duration_minutes, calories_burned.
- `record_day_metrics`: any of water_glasses, alcohol_drinks, sleep_hours,
  weight_kg. Omitted values keep what was stored before.
- `set_goals`: calorie_target, protein_target (g), water_target (glasses),
  goal_type (deficit, maintenance, surplus). `get_goals` shows the current
  targets; defaults are 2000 kcal, 150 g, 8 glasses, maintenance.

## Time Ranges

| range  | window                         | buckets      |
|--------|--------------------------------|--------------|
| 7d     | last 7 days including today    | one per day  |
| 30d    | last 30 days                   | one per day  |
| 3m     | last 90 days                   | one per day  |
| 1y     | last 12 calendar months        | one per month|
| custom | start..end inclusive, max 365  | one per day  |

A custom range with a missing bound, or a start after the end, is empty.

## Reading Reports

- Analytics need at least 2 tracked days in the range. A day counts as
  tracked when anything was logged: a meal, a workout, water, calories,
  alcohol, or sleep. Otherwise `has_enough_data` is false and `message`
  explains why.
- Month buckets average the month's tracked days. Sleep and weight average
  only the days where they were recorded.
- Trends compare the last two buckets.
- Goal achievement counts days at or above each target.
- Correlations need 5 paired observations; below that
  `sufficient_data` is false and the insight says so.

## Tools

- `get_analytics`: full report (buckets, stats, goals, weekly pattern,
  correlations, impacts).
- `get_goal_achievement`: goals and weekly pattern only.
- `get_correlations`: correlations and goal-aware impact estimates only.
- `get_daily_log`: everything logged on one date.
"#;

/// Runtime status of the Nutrack service
#[derive(Debug, Clone, Serialize)]
pub struct NutrackStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Analytics reports currently cached
    pub cached_reports: usize,
    pub default_user_id: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    default_user_id: String,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, default_user_id: String) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            default_user_id,
        }
    }

    /// Get the current status
    pub fn get_status(&self, cached_reports: usize) -> NutrackStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutrackStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            cached_reports,
            default_user_id: self.default_user_id.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
