//! Bucket aggregation
//!
//! Reduces daily logs into day or month buckets for display.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::DailyLog;
use super::range::Granularity;

/// Qualifying days needed before analytics are shown
pub const MIN_QUALIFYING_DAYS: usize = 2;

/// One display bucket (a day or a month)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsDataPoint {
    pub label: String,
    /// First day the bucket covers
    pub date: NaiveDate,
    pub calories: i64,
    pub calories_burned: i64,
    pub net_calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fats: i64,
    pub water: i64,
    pub alcohol: f64,
    pub sleep: Option<f64>,
    pub weight: Option<f64>,
    pub workouts: u32,
    pub meals: u32,
}

/// Whether anything at all was tracked on the day
pub fn has_data(log: &DailyLog) -> bool {
    !log.meals.is_empty()
        || !log.exercises.is_empty()
        || log.water_glasses > 0.0
        || log.calories_consumed > 0.0
        || log.alcohol_drinks.unwrap_or(0.0) > 0.0
        || recorded_sleep(log).is_some()
}

/// Sleep hours for the night, with zero read as not recorded
pub fn recorded_sleep(log: &DailyLog) -> Option<f64> {
    log.sleep_hours.filter(|h| *h > 0.0)
}

/// Days with at least one tracked metric, in input order
pub fn qualifying_days(logs: &[DailyLog]) -> Vec<DailyLog> {
    logs.iter().filter(|l| has_data(l)).cloned().collect()
}

/// Buckets at the requested granularity
pub fn aggregate(logs: &[DailyLog], granularity: Granularity) -> Vec<AnalyticsDataPoint> {
    match granularity {
        Granularity::Day => daily_points(logs),
        Granularity::Month => monthly_points(logs),
    }
}

/// One bucket per day
pub fn daily_points(logs: &[DailyLog]) -> Vec<AnalyticsDataPoint> {
    logs.iter()
        .map(|log| AnalyticsDataPoint {
            label: log.date.format("%b %-d").to_string(),
            date: log.date,
            calories: round_int(log.calories_consumed),
            calories_burned: round_int(log.calories_burned),
            net_calories: round_int(log.net_calories),
            protein: round_int(log.protein),
            carbs: round_int(log.carbs.unwrap_or(0.0)),
            fats: round_int(log.fats.unwrap_or(0.0)),
            water: round_int(log.water_glasses),
            alcohol: round2(log.alcohol_drinks.unwrap_or(0.0)),
            sleep: recorded_sleep(log).map(round2),
            weight: log.weight_kg.map(round2),
            workouts: log.exercises.len() as u32,
            meals: log.meals.len() as u32,
        })
        .collect()
}

/// One bucket per calendar month, oldest first.
///
/// Density fields are averaged over the month's qualifying days; workouts and
/// meals are summed. Sleep and weight average only the days that recorded
/// them, so a missing night never counts as zero hours.
pub fn monthly_points(logs: &[DailyLog]) -> Vec<AnalyticsDataPoint> {
    let mut by_month: BTreeMap<(i32, u32), Vec<&DailyLog>> = BTreeMap::new();
    for log in logs {
        by_month
            .entry((log.date.year(), log.date.month()))
            .or_default()
            .push(log);
    }

    by_month
        .into_values()
        .map(|days| {
            let start = days[0].date - chrono::Duration::days(days[0].date.day0() as i64);
            let tracked: Vec<&DailyLog> = days.iter().copied().filter(|l| has_data(l)).collect();

            AnalyticsDataPoint {
                label: start.format("%b %Y").to_string(),
                date: start,
                calories: round_int(mean(tracked.iter().map(|l| l.calories_consumed))),
                calories_burned: round_int(mean(tracked.iter().map(|l| l.calories_burned))),
                net_calories: round_int(mean(tracked.iter().map(|l| l.net_calories))),
                protein: round_int(mean(tracked.iter().map(|l| l.protein))),
                carbs: round_int(mean(tracked.iter().map(|l| l.carbs.unwrap_or(0.0)))),
                fats: round_int(mean(tracked.iter().map(|l| l.fats.unwrap_or(0.0)))),
                water: round_int(mean(tracked.iter().map(|l| l.water_glasses))),
                alcohol: round2(mean(tracked.iter().map(|l| l.alcohol_drinks.unwrap_or(0.0)))),
                sleep: mean_present(days.iter().copied().map(recorded_sleep)).map(round2),
                weight: mean_present(days.iter().map(|l| l.weight_kg)).map(round2),
                workouts: days.iter().map(|l| l.exercises.len() as u32).sum(),
                meals: days.iter().map(|l| l.meals.len() as u32).sum(),
            }
        })
        .collect()
}

/// Arithmetic mean; zero for an empty input
pub(crate) fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Mean of the present values; `None` when none are present
pub(crate) fn mean_present<I: Iterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let present: Vec<f64> = values.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(present.into_iter()))
    }
}

pub(crate) fn round_int(value: f64) -> i64 {
    value.round() as i64
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::day;
    use crate::models::{ExerciseSummary, MealSummary, MealType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn meal() -> MealSummary {
        MealSummary {
            name: "Eggs".into(),
            meal_type: MealType::Breakfast,
            calories: 300.0,
            protein: 20.0,
        }
    }

    fn workout() -> ExerciseSummary {
        ExerciseSummary {
            name: "Row".into(),
            duration_minutes: 20.0,
            calories_burned: 180.0,
        }
    }

    #[test]
    fn test_single_day_month_equals_day() {
        let mut log = day(date(2026, 4, 9), 2143.4, 121.6);
        log.carbs = Some(250.2);
        log.fats = Some(70.7);
        log.water_glasses = 6.0;
        log.alcohol_drinks = Some(1.333);
        log.sleep_hours = Some(7.256);
        log.meals = vec![meal(), meal()];
        log.exercises = vec![workout()];

        let daily = daily_points(std::slice::from_ref(&log));
        let monthly = monthly_points(std::slice::from_ref(&log));

        assert_eq!(monthly.len(), 1);
        let (d, m) = (&daily[0], &monthly[0]);
        assert_eq!(m.calories, d.calories);
        assert_eq!(m.protein, d.protein);
        assert_eq!(m.carbs, 250);
        assert_eq!(m.fats, 71);
        assert_eq!(m.water, d.water);
        assert_eq!(m.alcohol, 1.33);
        assert_eq!(m.sleep, Some(7.26));
        assert_eq!(m.workouts, 1);
        assert_eq!(m.meals, 2);
        assert_eq!(m.label, "Apr 2026");
        assert_eq!(m.date, date(2026, 4, 1));
    }

    #[test]
    fn test_month_sleep_mean() {
        let mut a = day(date(2026, 5, 1), 2000.0, 100.0);
        a.sleep_hours = Some(6.0);
        let mut b = day(date(2026, 5, 2), 2000.0, 100.0);
        b.sleep_hours = Some(8.0);

        let points = monthly_points(&[a, b]);
        assert_eq!(points[0].sleep, Some(7.00));
    }

    #[test]
    fn test_month_sleep_ignores_missing_nights() {
        let a = day(date(2026, 5, 1), 2000.0, 100.0);
        let mut b = day(date(2026, 5, 2), 2000.0, 100.0);
        b.sleep_hours = Some(8.0);

        let points = monthly_points(&[a, b]);
        assert_eq!(points[0].sleep, Some(8.00));
    }

    #[test]
    fn test_zero_sleep_is_not_recorded() {
        let mut a = day(date(2026, 5, 1), 2000.0, 100.0);
        a.sleep_hours = Some(0.0);
        let mut b = day(date(2026, 5, 2), 2000.0, 100.0);
        b.sleep_hours = Some(8.0);

        assert_eq!(monthly_points(&[a.clone(), b])[0].sleep, Some(8.00));
        assert_eq!(monthly_points(&[a.clone()])[0].sleep, None);
        assert_eq!(daily_points(&[a])[0].sleep, None);
    }

    #[test]
    fn test_month_without_sleep_has_none() {
        let points = monthly_points(&[day(date(2026, 5, 1), 2000.0, 100.0)]);
        assert_eq!(points[0].sleep, None);
    }

    #[test]
    fn test_month_means_and_sums() {
        let mut a = day(date(2026, 6, 1), 1800.0, 100.0);
        a.meals = vec![meal()];
        a.exercises = vec![workout()];
        let mut b = day(date(2026, 6, 2), 2201.0, 141.0);
        b.meals = vec![meal(), meal()];
        b.exercises = vec![workout(), workout()];
        b.alcohol_drinks = Some(3.0);
        // untracked day in the same month
        let c = DailyLog::empty(date(2026, 6, 3));
        let july = day(date(2026, 7, 1), 2500.0, 90.0);

        let points = monthly_points(&[a, b, c, july]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].calories, 2001); // (1800 + 2201) / 2 = 2000.5
        assert_eq!(points[0].protein, 121);
        assert_eq!(points[0].alcohol, 1.5);
        assert_eq!(points[0].carbs, 0);
        assert_eq!(points[0].workouts, 3);
        assert_eq!(points[0].meals, 3);
        assert_eq!(points[1].label, "Jul 2026");
        assert_eq!(points[1].calories, 2500);
    }

    #[test]
    fn test_daily_points_labels_and_defaults() {
        let points = daily_points(&[day(date(2026, 10, 3), 1999.6, 0.0)]);
        assert_eq!(points[0].label, "Oct 3");
        assert_eq!(points[0].calories, 2000);
        assert_eq!(points[0].carbs, 0);
        assert_eq!(points[0].alcohol, 0.0);
        assert_eq!(points[0].sleep, None);
    }

    #[test]
    fn test_has_data() {
        let empty = DailyLog::empty(date(2026, 1, 1));
        assert!(!has_data(&empty));

        let mut zero_sleep = empty.clone();
        zero_sleep.sleep_hours = Some(0.0);
        assert!(!has_data(&zero_sleep));

        let mut water = empty.clone();
        water.water_glasses = 1.0;
        assert!(has_data(&water));

        let mut slept = empty.clone();
        slept.sleep_hours = Some(6.5);
        assert!(has_data(&slept));

        let mut drank = empty;
        drank.alcohol_drinks = Some(1.0);
        assert!(has_data(&drank));
    }

    #[test]
    fn test_qualifying_days_filters() {
        let logs = vec![
            DailyLog::empty(date(2026, 1, 1)),
            day(date(2026, 1, 2), 1500.0, 90.0),
            DailyLog::empty(date(2026, 1, 3)),
        ];
        let kept = qualifying_days(&logs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, date(2026, 1, 2));
    }
}
