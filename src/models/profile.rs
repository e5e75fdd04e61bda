//! User profile model
//!
//! Daily targets and the direction of the user's goal.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Direction of the user's weight goal
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Eating below maintenance to lose weight
    Deficit,
    #[default]
    Maintenance,
    /// Eating above maintenance to gain weight
    Surplus,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Deficit => "deficit",
            GoalType::Maintenance => "maintenance",
            GoalType::Surplus => "surplus",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deficit" | "lose" | "cut" => Some(GoalType::Deficit),
            "maintenance" | "maintain" => Some(GoalType::Maintenance),
            "surplus" | "gain" | "bulk" => Some(GoalType::Surplus),
            _ => None,
        }
    }
}

/// A user's daily targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub calorie_target: f64,
    pub protein_target: f64, // grams
    pub water_target: f64,   // glasses
    pub goal_type: GoalType,
}

impl UserProfile {
    /// Targets used when the user never set any
    pub fn default_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            calorie_target: 2000.0,
            protein_target: 150.0,
            water_target: 8.0,
            goal_type: GoalType::Maintenance,
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let goal: String = row.get("goal_type")?;
        Ok(Self {
            user_id: row.get("user_id")?,
            calorie_target: row.get("calorie_target")?,
            protein_target: row.get("protein_target")?,
            water_target: row.get("water_target")?,
            goal_type: GoalType::from_str(&goal).unwrap_or_default(),
        })
    }

    pub fn get(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profiles WHERE user_id = ?1")?;

        match stmt.query_row([user_id], Self::from_row) {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored profile, or the defaults
    pub fn get_or_default(conn: &Connection, user_id: &str) -> DbResult<Self> {
        Ok(Self::get(conn, user_id)?.unwrap_or_else(|| Self::default_for(user_id)))
    }

    /// Insert or replace the profile
    pub fn save(conn: &Connection, profile: &UserProfile) -> DbResult<Self> {
        for (field, value) in [
            ("calorie_target", profile.calorie_target),
            ("protein_target", profile.protein_target),
            ("water_target", profile.water_target),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DbError::InvalidValue(format!("{} must be > 0, got {}", field, value)));
            }
        }

        conn.execute(
            r#"
            INSERT INTO user_profiles (user_id, calorie_target, protein_target, water_target, goal_type)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                calorie_target = excluded.calorie_target,
                protein_target = excluded.protein_target,
                water_target = excluded.water_target,
                goal_type = excluded.goal_type,
                updated_at = datetime('now')
            "#,
            params![
                profile.user_id,
                profile.calorie_target,
                profile.protein_target,
                profile.water_target,
                profile.goal_type.as_str(),
            ],
        )?;

        Self::get(conn, &profile.user_id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}
