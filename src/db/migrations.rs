//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Whether the schema is at the version this build expects
pub fn is_current(conn: &Connection) -> DbResult<bool> {
    Ok(get_schema_version(conn)? == SCHEMA_VERSION)
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- MEALS
        -- One row per logged meal, macros already totalled
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,                  -- ISO date: "2026-10-16"
            name TEXT NOT NULL,
            meal_type TEXT NOT NULL DEFAULT 'unspecified'
                CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack', 'unspecified')),
            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,     -- grams
            carbs REAL,                          -- grams, nullable (not always tracked)
            fats REAL,                           -- grams, nullable
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meals_user_date ON meals(user_id, date);

        -- ============================================
        -- EXERCISES
        -- ============================================
        CREATE TABLE exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            name TEXT NOT NULL,
            duration_minutes REAL NOT NULL DEFAULT 0,
            calories_burned REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_exercises_user_date ON exercises(user_id, date);

        -- ============================================
        -- DAY METRICS
        -- Per-day scalar trackers (water, alcohol, sleep, weight)
        -- ============================================
        CREATE TABLE day_metrics (
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            water_glasses REAL NOT NULL DEFAULT 0,
            alcohol_drinks REAL,
            sleep_hours REAL,
            weight_kg REAL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, date)
        );

        -- ============================================
        -- USER PROFILES
        -- Daily targets and goal direction
        -- ============================================
        CREATE TABLE user_profiles (
            user_id TEXT PRIMARY KEY,
            calorie_target REAL NOT NULL,
            protein_target REAL NOT NULL,
            water_target REAL NOT NULL,
            goal_type TEXT NOT NULL DEFAULT 'maintenance'
                CHECK(goal_type IN ('deficit', 'maintenance', 'surplus')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}
