//! Day metrics model
//!
//! Scalar per-day trackers: water, alcohol, sleep, and body weight.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Tracked metrics for one user and date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMetrics {
    pub user_id: String,
    pub date: String,
    pub water_glasses: f64,
    pub alcohol_drinks: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
}

/// Partial update; `None` leaves the stored value unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayMetricsUpdate {
    pub water_glasses: Option<f64>,
    pub alcohol_drinks: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
}

impl DayMetrics {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            water_glasses: row.get("water_glasses")?,
            alcohol_drinks: row.get("alcohol_drinks")?,
            sleep_hours: row.get("sleep_hours")?,
            weight_kg: row.get("weight_kg")?,
        })
    }

    pub fn get(conn: &Connection, user_id: &str, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM day_metrics WHERE user_id = ?1 AND date = ?2",
        )?;

        match stmt.query_row(params![user_id, date], Self::from_row) {
            Ok(metrics) => Ok(Some(metrics)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or merge metrics for a date
    pub fn upsert(
        conn: &Connection,
        user_id: &str,
        date: &str,
        data: &DayMetricsUpdate,
    ) -> DbResult<Self> {
        for (field, value) in [
            ("water_glasses", data.water_glasses),
            ("alcohol_drinks", data.alcohol_drinks),
            ("sleep_hours", data.sleep_hours),
            ("weight_kg", data.weight_kg),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(DbError::InvalidValue(format!("{} must be >= 0, got {}", field, v)));
                }
            }
        }

        conn.execute(
            r#"
            INSERT INTO day_metrics (user_id, date, water_glasses, alcohol_drinks, sleep_hours, weight_kg)
            VALUES (?1, ?2, COALESCE(?3, 0), ?4, ?5, ?6)
            ON CONFLICT(user_id, date) DO UPDATE SET
                water_glasses = COALESCE(?3, water_glasses),
                alcohol_drinks = COALESCE(?4, alcohol_drinks),
                sleep_hours = COALESCE(?5, sleep_hours),
                weight_kg = COALESCE(?6, weight_kg),
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                date,
                data.water_glasses,
                data.alcohol_drinks,
                data.sleep_hours,
                data.weight_kg,
            ],
        )?;

        Self::get(conn, user_id, date)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_db;

    #[test]
    fn test_upsert_merges_fields() {
        let db = memory_db();
        db.with_conn(|conn| {
            let first = DayMetrics::upsert(conn, "ana", "2026-10-01", &DayMetricsUpdate {
                water_glasses: Some(3.0),
                ..Default::default()
            })?;
            assert_eq!(first.water_glasses, 3.0);
            assert_eq!(first.sleep_hours, None);

            let merged = DayMetrics::upsert(conn, "ana", "2026-10-01", &DayMetricsUpdate {
                sleep_hours: Some(7.5),
                ..Default::default()
            })?;
            assert_eq!(merged.water_glasses, 3.0);
            assert_eq!(merged.sleep_hours, Some(7.5));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_upsert_rejects_negative_values() {
        let db = memory_db();
        let result = db.with_conn(|conn| {
            DayMetrics::upsert(conn, "ana", "2026-10-01", &DayMetricsUpdate {
                alcohol_drinks: Some(-1.0),
                ..Default::default()
            })
        });
        assert!(matches!(result, Err(DbError::InvalidValue(_))));
    }
}
