//! Exercise model
//!
//! A logged workout with its estimated calorie burn.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A logged exercise session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub user_id: String,
    pub date: String,
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub created_at: String,
}

/// Data for logging an exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCreate {
    pub user_id: String,
    pub date: String,
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
}

impl Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            name: row.get("name")?,
            duration_minutes: row.get("duration_minutes")?,
            calories_burned: row.get("calories_burned")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ExerciseCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO exercises (user_id, date, name, duration_minutes, calories_burned)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.user_id,
                data.date,
                data.name,
                data.duration_minutes,
                data.calories_burned,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_for_date(conn: &Connection, user_id: &str, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM exercises WHERE user_id = ?1 AND date = ?2 ORDER BY id",
        )?;

        let exercises = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(exercises)
    }
}
