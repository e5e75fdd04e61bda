//! Summary statistics
//!
//! Averages, bucket-to-bucket trends, goal achievement, and weekday patterns.

use std::fmt;

use chrono::{Datelike, Weekday};
use serde::Serialize;

use crate::models::{DailyLog, UserProfile};
use super::aggregate::{mean, mean_present, recorded_sleep, round2, round_int, AnalyticsDataPoint};

// ============================================================================
// Trends
// ============================================================================

/// Change between the last two buckets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "delta", rename_all = "snake_case")]
pub enum Trend {
    Change(f64),
    NoChange,
}

impl Trend {
    pub fn between(previous: f64, last: f64) -> Self {
        let delta = round2(last - previous);
        if delta == 0.0 {
            Trend::NoChange
        } else {
            Trend::Change(delta)
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Change(delta) => write!(f, "{:+}", delta),
            Trend::NoChange => write!(f, "no change"),
        }
    }
}

/// Bucket field a trend can be taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendField {
    Calories,
    NetCalories,
    Protein,
    Water,
    Weight,
}

impl TrendField {
    fn value(&self, point: &AnalyticsDataPoint) -> Option<f64> {
        match self {
            TrendField::Calories => Some(point.calories as f64),
            TrendField::NetCalories => Some(point.net_calories as f64),
            TrendField::Protein => Some(point.protein as f64),
            TrendField::Water => Some(point.water as f64),
            TrendField::Weight => point.weight,
        }
    }
}

/// Last bucket minus the one before it; `None` without two comparable buckets
pub fn trend(points: &[AnalyticsDataPoint], field: TrendField) -> Option<Trend> {
    let [.., previous, last] = points else {
        return None;
    };
    Some(Trend::between(field.value(previous)?, field.value(last)?))
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub qualifying_days: usize,
    pub avg_calories: i64,
    pub avg_calories_burned: i64,
    pub avg_net_calories: i64,
    pub avg_protein: i64,
    pub avg_carbs: i64,
    pub avg_fats: i64,
    pub avg_water: f64,
    pub avg_alcohol: f64,
    pub avg_sleep: Option<f64>,
    pub total_workouts: u32,
    pub total_meals: u32,
    pub calorie_trend: Option<Trend>,
    pub protein_trend: Option<Trend>,
    pub weight_trend: Option<Trend>,
}

/// Averages over qualifying days plus trends over the display buckets
pub fn summarize(days: &[DailyLog], points: &[AnalyticsDataPoint]) -> StatsSummary {
    StatsSummary {
        qualifying_days: days.len(),
        avg_calories: round_int(mean(days.iter().map(|d| d.calories_consumed))),
        avg_calories_burned: round_int(mean(days.iter().map(|d| d.calories_burned))),
        avg_net_calories: round_int(mean(days.iter().map(|d| d.net_calories))),
        avg_protein: round_int(mean(days.iter().map(|d| d.protein))),
        avg_carbs: round_int(mean(days.iter().map(|d| d.carbs.unwrap_or(0.0)))),
        avg_fats: round_int(mean(days.iter().map(|d| d.fats.unwrap_or(0.0)))),
        avg_water: round2(mean(days.iter().map(|d| d.water_glasses))),
        avg_alcohol: round2(mean(days.iter().map(|d| d.alcohol_drinks.unwrap_or(0.0)))),
        avg_sleep: mean_present(days.iter().map(recorded_sleep)).map(round2),
        total_workouts: days.iter().map(|d| d.exercises.len() as u32).sum(),
        total_meals: days.iter().map(|d| d.meals.len() as u32).sum(),
        calorie_trend: trend(points, TrendField::Calories),
        protein_trend: trend(points, TrendField::Protein),
        weight_trend: trend(points, TrendField::Weight),
    }
}

// ============================================================================
// Goal achievement
// ============================================================================

/// Days meeting or exceeding one target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalRate {
    pub target: f64,
    pub days_met: usize,
    pub total_days: usize,
    /// Rounded percentage of days met
    pub percentage: u32,
}

impl GoalRate {
    fn over<F: Fn(&DailyLog) -> f64>(days: &[DailyLog], target: f64, value: F) -> Self {
        let days_met = days.iter().filter(|d| value(d) >= target).count();
        Self {
            target,
            days_met,
            total_days: days.len(),
            percentage: percentage(days_met, days.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalAchievement {
    pub calories: GoalRate,
    pub protein: GoalRate,
    pub water: GoalRate,
}

pub fn goal_achievement(days: &[DailyLog], profile: &UserProfile) -> GoalAchievement {
    GoalAchievement {
        calories: GoalRate::over(days, profile.calorie_target, |d| d.calories_consumed),
        protein: GoalRate::over(days, profile.protein_target, |d| d.protein),
        water: GoalRate::over(days, profile.water_target, |d| d.water_glasses),
    }
}

fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

fn targets_met(day: &DailyLog, profile: &UserProfile) -> usize {
    [
        day.calories_consumed >= profile.calorie_target,
        day.protein >= profile.protein_target,
        day.water_glasses >= profile.water_target,
    ]
    .iter()
    .filter(|met| **met)
    .count()
}

// ============================================================================
// Weekly pattern
// ============================================================================

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn day_of_week_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: &'static str,
    pub days: usize,
    pub avg_calories: i64,
    pub avg_protein: i64,
    /// Mean number of targets (calories, protein, water) met
    pub avg_targets_met: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPattern {
    /// Monday first
    pub weekdays: Vec<WeekdayAverage>,
    pub best_day: Option<&'static str>,
    pub workouts_per_week: f64,
    pub weekday_avg_calories: i64,
    pub weekend_avg_calories: i64,
}

/// Weekday breakdown over qualifying days.
///
/// `span_days` is the length of the whole window, so workout frequency isn't
/// inflated by untracked days.
pub fn weekly_pattern(days: &[DailyLog], profile: &UserProfile, span_days: usize) -> WeeklyPattern {
    let weekdays: Vec<WeekdayAverage> = WEEK
        .iter()
        .map(|&weekday| {
            let matching: Vec<&DailyLog> =
                days.iter().filter(|d| d.date.weekday() == weekday).collect();
            WeekdayAverage {
                weekday: day_of_week_abbrev(weekday),
                days: matching.len(),
                avg_calories: round_int(mean(matching.iter().map(|d| d.calories_consumed))),
                avg_protein: round_int(mean(matching.iter().map(|d| d.protein))),
                avg_targets_met: round2(mean(
                    matching.iter().map(|d| targets_met(d, profile) as f64),
                )),
            }
        })
        .collect();

    // Strictly greater keeps the earliest weekday on ties.
    let mut best: Option<&WeekdayAverage> = None;
    for candidate in weekdays.iter().filter(|w| w.days > 0) {
        if best.map_or(true, |b| candidate.avg_targets_met > b.avg_targets_met) {
            best = Some(candidate);
        }
    }
    let best_day = best.map(|w| w.weekday);

    let workouts: usize = days.iter().map(|d| d.exercises.len()).sum();
    let workouts_per_week = if span_days == 0 {
        0.0
    } else {
        (workouts as f64 / (span_days as f64 / 7.0) * 10.0).round() / 10.0
    };

    let is_weekend = |d: &&DailyLog| matches!(d.date.weekday(), Weekday::Sat | Weekday::Sun);
    let weekend_avg_calories =
        round_int(mean(days.iter().filter(is_weekend).map(|d| d.calories_consumed)));
    let weekday_avg_calories = round_int(mean(
        days.iter().filter(|d| !is_weekend(d)).map(|d| d.calories_consumed),
    ));

    WeeklyPattern {
        weekdays,
        best_day,
        workouts_per_week,
        weekday_avg_calories,
        weekend_avg_calories,
    }
}
