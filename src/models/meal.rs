//! Meal model
//!
//! A logged meal with its macro totals, attached to a user and a date.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Macros;

/// Meal type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Unspecified,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Unspecified => "unspecified",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "breakfast" => MealType::Breakfast,
            "lunch" => MealType::Lunch,
            "dinner" => MealType::Dinner,
            "snack" => MealType::Snack,
            _ => MealType::Unspecified,
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub user_id: String,
    pub date: String,
    pub name: String,
    pub meal_type: MealType,
    pub macros: Macros,
    pub created_at: String,
}

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub user_id: String,
    pub date: String,
    pub name: String,
    pub meal_type: MealType,
    pub macros: Macros,
}

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: String = row.get("meal_type")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            name: row.get("name")?,
            meal_type: MealType::from_str(&meal_type),
            macros: Macros {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fats: row.get("fats")?,
            },
            created_at: row.get("created_at")?,
        })
    }

    /// Log a new meal
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO meals (user_id, date, name, meal_type, calories, protein, carbs, fats)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.user_id,
                data.date,
                data.name,
                data.meal_type.as_str(),
                data.macros.calories,
                data.macros.protein,
                data.macros.carbs,
                data.macros.fats,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All meals a user logged on a date, in logging order
    pub fn list_for_date(conn: &Connection, user_id: &str, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE user_id = ?1 AND date = ?2 ORDER BY id",
        )?;

        let meals = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_db;

    fn lunch(user: &str, date: &str) -> MealCreate {
        MealCreate {
            user_id: user.to_string(),
            date: date.to_string(),
            name: "Chicken bowl".to_string(),
            meal_type: MealType::Lunch,
            macros: Macros { calories: 650.0, protein: 45.0, carbs: Some(70.0), fats: None },
        }
    }

    #[test]
    fn test_create_and_list_for_date() {
        let db = memory_db();
        db.with_conn(|conn| {
            let meal = Meal::create(conn, &lunch("ana", "2026-10-01"))?;
            assert_eq!(meal.meal_type, MealType::Lunch);
            assert_eq!(meal.macros.fats, None);

            Meal::create(conn, &lunch("ana", "2026-10-02"))?;
            Meal::create(conn, &lunch("ben", "2026-10-01"))?;

            let meals = Meal::list_for_date(conn, "ana", "2026-10-01")?;
            assert_eq!(meals.len(), 1);
            assert_eq!(meals[0].id, meal.id);

            assert!(Meal::delete(conn, meal.id)?);
            assert!(Meal::list_for_date(conn, "ana", "2026-10-01")?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_meal_type_parsing_falls_back_to_unspecified() {
        assert_eq!(MealType::from_str("Dinner"), MealType::Dinner);
        assert_eq!(MealType::from_str("brunch"), MealType::Unspecified);
    }
}
