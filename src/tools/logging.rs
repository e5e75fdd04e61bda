//! Logging MCP Tools
//!
//! Minimal write path: meals, exercises, day metrics, and goals. Every write
//! goes through [`SqliteStore`] so cached analytics are invalidated.

use serde::Serialize;

use crate::models::{
    DayMetrics, DayMetricsUpdate, Exercise, ExerciseCreate, GoalType, Macros, Meal, MealCreate,
    MealType, UserProfile,
};
use crate::store::SqliteStore;
use super::parse_date;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub id: i64,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    pub profile: UserProfile,
    /// False when no targets were ever saved and defaults apply
    pub customized: bool,
}

// ============================================================================
// Helpers
// ============================================================================

fn non_negative(field: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{} must be a non-negative number, got {}", field, value))
    }
}

// ============================================================================
// Meal and Exercise Tools
// ============================================================================

/// Log a meal with its macro totals
#[allow(clippy::too_many_arguments)]
pub fn log_meal(
    store: &SqliteStore,
    user_id: &str,
    date: &str,
    name: &str,
    meal_type: &str,
    calories: f64,
    protein: f64,
    carbs: Option<f64>,
    fats: Option<f64>,
) -> Result<Meal, String> {
    let date = parse_date(date)?;
    if name.trim().is_empty() {
        return Err("Meal name must not be empty".to_string());
    }
    let calories = non_negative("calories", calories)?;
    let protein = non_negative("protein", protein)?;
    let carbs = carbs.map(|v| non_negative("carbs", v)).transpose()?;
    let fats = fats.map(|v| non_negative("fats", v)).transpose()?;

    let data = MealCreate {
        user_id: user_id.to_string(),
        date: date.to_string(),
        name: name.trim().to_string(),
        meal_type: MealType::from_str(meal_type),
        macros: Macros {
            calories,
            protein,
            carbs,
            fats,
        },
    };

    store
        .log_meal(&data)
        .map_err(|e| format!("Failed to log meal: {}", e))
}

/// Delete a logged meal
pub fn delete_meal(store: &SqliteStore, id: i64) -> Result<DeleteMealResponse, String> {
    let deleted = store
        .delete_meal(id)
        .map_err(|e| format!("Failed to delete meal: {}", e))?;
    Ok(DeleteMealResponse { id, deleted })
}

/// Log an exercise session
pub fn log_exercise(
    store: &SqliteStore,
    user_id: &str,
    date: &str,
    name: &str,
    duration_minutes: f64,
    calories_burned: f64,
) -> Result<Exercise, String> {
    let date = parse_date(date)?;
    if name.trim().is_empty() {
        return Err("Exercise name must not be empty".to_string());
    }
    let duration_minutes = non_negative("duration_minutes", duration_minutes)?;
    let calories_burned = non_negative("calories_burned", calories_burned)?;

    let data = ExerciseCreate {
        user_id: user_id.to_string(),
        date: date.to_string(),
        name: name.trim().to_string(),
        duration_minutes,
        calories_burned,
    };

    store
        .log_exercise(&data)
        .map_err(|e| format!("Failed to log exercise: {}", e))
}

// ============================================================================
// Day Metrics Tools
// ============================================================================

/// Record water, alcohol, sleep, or weight for a date
pub fn record_day_metrics(
    store: &SqliteStore,
    user_id: &str,
    date: &str,
    update: DayMetricsUpdate,
) -> Result<DayMetrics, String> {
    let date = parse_date(date)?;
    if update.water_glasses.is_none()
        && update.alcohol_drinks.is_none()
        && update.sleep_hours.is_none()
        && update.weight_kg.is_none()
    {
        return Err("Provide at least one of water_glasses, alcohol_drinks, sleep_hours, weight_kg".to_string());
    }

    store
        .record_day_metrics(user_id, &date.to_string(), &update)
        .map_err(|e| format!("Failed to record day metrics: {}", e))
}

// ============================================================================
// Goal Tools
// ============================================================================

/// Update the user's targets; omitted values keep their current setting
pub fn set_goals(
    store: &SqliteStore,
    user_id: &str,
    calorie_target: Option<f64>,
    protein_target: Option<f64>,
    water_target: Option<f64>,
    goal_type: Option<&str>,
) -> Result<GoalsResponse, String> {
    let mut profile = store
        .load_profile(user_id)
        .map_err(|e| format!("Failed to load goals: {}", e))?;

    if let Some(v) = calorie_target {
        profile.calorie_target = v;
    }
    if let Some(v) = protein_target {
        profile.protein_target = v;
    }
    if let Some(v) = water_target {
        profile.water_target = v;
    }
    if let Some(goal) = goal_type {
        profile.goal_type = GoalType::from_str(goal).ok_or_else(|| {
            format!("Unknown goal type '{}', expected deficit, maintenance or surplus", goal)
        })?;
    }

    let profile = store
        .save_profile(&profile)
        .map_err(|e| format!("Failed to save goals: {}", e))?;

    Ok(GoalsResponse {
        profile,
        customized: true,
    })
}

/// Current targets for a user
pub fn get_goals(store: &SqliteStore, user_id: &str) -> Result<GoalsResponse, String> {
    let stored = store
        .database()
        .with_conn(|conn| UserProfile::get(conn, user_id))
        .map_err(|e| format!("Failed to load goals: {}", e))?;

    Ok(match stored {
        Some(profile) => GoalsResponse {
            profile,
            customized: true,
        },
        None => GoalsResponse {
            profile: UserProfile::default_for(user_id),
            customized: false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_db;

    fn store() -> SqliteStore {
        SqliteStore::new(memory_db())
    }

    #[test]
    fn test_log_meal_rejects_bad_date() {
        let err = log_meal(&store(), "ana", "2026-13-01", "Toast", "breakfast", 200.0, 5.0, None, None)
            .unwrap_err();
        assert!(err.contains("Invalid date"));
    }

    #[test]
    fn test_log_meal_normalizes_input() {
        let meal = log_meal(&store(), "ana", "2026-10-16", "  Oats ", "Breakfast", 350.0, 12.0, Some(60.0), None)
            .unwrap();
        assert_eq!(meal.name, "Oats");
        assert_eq!(meal.meal_type, MealType::Breakfast);
        assert_eq!(meal.date, "2026-10-16");
    }

    #[test]
    fn test_log_meal_rejects_negative_macros() {
        let store = store();
        let err = log_meal(&store, "ana", "2026-10-16", "Toast", "breakfast", -200.0, 5.0, None, None)
            .unwrap_err();
        assert!(err.contains("calories"));
        let err = log_meal(&store, "ana", "2026-10-16", "Toast", "breakfast", 200.0, 5.0, None, Some(-1.0))
            .unwrap_err();
        assert!(err.contains("fats"));
        assert!(log_meal(&store, "ana", "2026-10-16", "Toast", "breakfast", 200.0, f64::NAN, None, None).is_err());
        assert!(log_meal(&store, "ana", "2026-10-16", "Water", "snack", 0.0, 0.0, Some(0.0), None).is_ok());
    }

    #[test]
    fn test_log_exercise_rejects_negative_values() {
        let store = store();
        let err = log_exercise(&store, "ana", "2026-10-16", "Run", -30.0, 300.0).unwrap_err();
        assert!(err.contains("duration_minutes"));
        let err = log_exercise(&store, "ana", "2026-10-16", "Run", 30.0, f64::INFINITY).unwrap_err();
        assert!(err.contains("calories_burned"));
        let run = log_exercise(&store, "ana", "2026-10-16", "Run", 30.0, 300.0).unwrap();
        assert_eq!(run.duration_minutes, 30.0);
    }

    #[test]
    fn test_record_day_metrics_requires_a_value() {
        let err = record_day_metrics(&store(), "ana", "2026-10-16", DayMetricsUpdate::default()).unwrap_err();
        assert!(err.contains("at least one"));
    }

    #[test]
    fn test_set_goals_merges_with_defaults() {
        let store = store();
        assert!(!get_goals(&store, "ana").unwrap().customized);

        let saved = set_goals(&store, "ana", None, Some(120.0), None, Some("cut")).unwrap();
        assert_eq!(saved.profile.calorie_target, 2000.0);
        assert_eq!(saved.profile.protein_target, 120.0);
        assert_eq!(saved.profile.goal_type, GoalType::Deficit);

        let loaded = get_goals(&store, "ana").unwrap();
        assert!(loaded.customized);
        assert_eq!(loaded.profile, saved.profile);
    }

    #[test]
    fn test_set_goals_rejects_unknown_goal() {
        let err = set_goals(&store(), "ana", None, None, None, Some("sideways")).unwrap_err();
        assert!(err.contains("Unknown goal type"));
    }

    #[test]
    fn test_delete_missing_meal() {
        let resp = delete_meal(&store(), 42).unwrap();
        assert!(!resp.deleted);
    }
}
