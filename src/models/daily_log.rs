//! Daily log
//!
//! Per-day aggregate assembled from meals, exercises, and day metrics.
//! Never stored as a unit; rebuilt on every fetch.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{DayMetrics, Exercise, Macros, Meal, MealType};

/// Meal line in a daily log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
    pub protein: f64,
}

/// Exercise line in a daily log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
}

/// Everything tracked for one user on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub calories_consumed: f64,
    pub calories_burned: f64,
    /// consumed minus burned
    pub net_calories: f64,
    pub protein: f64,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub water_glasses: f64,
    pub alcohol_drinks: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
    pub meals: Vec<MealSummary>,
    pub exercises: Vec<ExerciseSummary>,
}

impl DailyLog {
    /// A date with nothing logged
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            calories_consumed: 0.0,
            calories_burned: 0.0,
            net_calories: 0.0,
            protein: 0.0,
            carbs: None,
            fats: None,
            water_glasses: 0.0,
            alcohol_drinks: None,
            sleep_hours: None,
            weight_kg: None,
            meals: Vec::new(),
            exercises: Vec::new(),
        }
    }

    /// Build the log for a user and date from the source tables
    pub fn assemble(conn: &Connection, user_id: &str, date: NaiveDate) -> DbResult<Self> {
        let iso = date.format("%Y-%m-%d").to_string();

        let meals = Meal::list_for_date(conn, user_id, &iso)?;
        let exercises = Exercise::list_for_date(conn, user_id, &iso)?;
        let metrics = DayMetrics::get(conn, user_id, &iso)?;

        let totals: Macros = meals.iter().map(|m| m.macros).sum();
        let burned: f64 = exercises.iter().map(|e| e.calories_burned).sum();

        let mut log = Self::empty(date);
        log.calories_consumed = totals.calories;
        log.calories_burned = burned;
        log.net_calories = totals.calories - burned;
        log.protein = totals.protein;
        log.carbs = totals.carbs;
        log.fats = totals.fats;

        if let Some(m) = metrics {
            log.water_glasses = m.water_glasses;
            log.alcohol_drinks = m.alcohol_drinks;
            log.sleep_hours = m.sleep_hours;
            log.weight_kg = m.weight_kg;
        }

        log.meals = meals
            .into_iter()
            .map(|m| MealSummary {
                name: m.name,
                meal_type: m.meal_type,
                calories: m.macros.calories,
                protein: m.macros.protein,
            })
            .collect();

        log.exercises = exercises
            .into_iter()
            .map(|e| ExerciseSummary {
                name: e.name,
                duration_minutes: e.duration_minutes,
                calories_burned: e.calories_burned,
            })
            .collect();

        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_db;
    use crate::models::{DayMetricsUpdate, ExerciseCreate, MealCreate};

    #[test]
    fn test_assemble_combines_tables() {
        let db = memory_db();
        let date = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();

        let log = db
            .with_conn(|conn| {
                for (name, kcal, protein) in [("Oats", 400.0, 20.0), ("Steak", 900.0, 70.0)] {
                    Meal::create(conn, &MealCreate {
                        user_id: "ana".into(),
                        date: "2026-10-05".into(),
                        name: name.into(),
                        meal_type: MealType::Unspecified,
                        macros: Macros { calories: kcal, protein, carbs: None, fats: None },
                    })?;
                }
                Exercise::create(conn, &ExerciseCreate {
                    user_id: "ana".into(),
                    date: "2026-10-05".into(),
                    name: "Run".into(),
                    duration_minutes: 30.0,
                    calories_burned: 300.0,
                })?;
                DayMetrics::upsert(conn, "ana", "2026-10-05", &DayMetricsUpdate {
                    water_glasses: Some(6.0),
                    sleep_hours: Some(7.0),
                    ..Default::default()
                })?;
                DailyLog::assemble(conn, "ana", date)
            })
            .unwrap();

        assert_eq!(log.calories_consumed, 1300.0);
        assert_eq!(log.calories_burned, 300.0);
        assert_eq!(log.net_calories, 1000.0);
        assert_eq!(log.protein, 90.0);
        assert_eq!(log.carbs, None);
        assert_eq!(log.water_glasses, 6.0);
        assert_eq!(log.sleep_hours, Some(7.0));
        assert_eq!(log.meals.len(), 2);
        assert_eq!(log.exercises.len(), 1);
    }

    #[test]
    fn test_assemble_empty_date() {
        let db = memory_db();
        let date = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        let log = db.with_conn(|conn| DailyLog::assemble(conn, "ana", date)).unwrap();
        assert_eq!(log, DailyLog::empty(date));
    }
}
