//! SQLite-backed data access
//!
//! Reads run on the blocking pool so a batch of lookups can proceed in
//! parallel over pooled connections. Writes publish a [`TableChange`].

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::debug;

use crate::db::{Database, DbResult};
use crate::models::{
    DailyLog, DayMetrics, DayMetricsUpdate, Exercise, ExerciseCreate, Meal, MealCreate,
    UserProfile,
};
use super::{ChangedTable, DataAccess, DataAccessError, TableChange};

/// Capacity of the change channel; slow subscribers see `Lagged` past this
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Data access over the local SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    database: Database,
    changes: broadcast::Sender<TableChange>,
}

impl SqliteStore {
    pub fn new(database: Database) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { database, changes }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn publish(&self, table: ChangedTable, user_id: &str) {
        let change = TableChange {
            table,
            user_id: user_id.to_string(),
        };
        // No subscribers is fine: nothing is cached yet.
        if self.changes.send(change).is_err() {
            debug!(?table, user_id, "change published with no subscribers");
        }
    }

    /// Log a meal and notify subscribers
    pub fn log_meal(&self, data: &MealCreate) -> DbResult<Meal> {
        let meal = self.database.with_conn(|conn| Meal::create(conn, data))?;
        self.publish(ChangedTable::Meals, &data.user_id);
        Ok(meal)
    }

    /// Delete a meal and notify subscribers when a row was removed
    pub fn delete_meal(&self, id: i64) -> DbResult<bool> {
        let meal = self.database.with_conn(|conn| Meal::get_by_id(conn, id))?;
        let Some(meal) = meal else {
            return Ok(false);
        };
        let deleted = self.database.with_conn(|conn| Meal::delete(conn, id))?;
        if deleted {
            self.publish(ChangedTable::Meals, &meal.user_id);
        }
        Ok(deleted)
    }

    /// Log an exercise and notify subscribers
    pub fn log_exercise(&self, data: &ExerciseCreate) -> DbResult<Exercise> {
        let exercise = self.database.with_conn(|conn| Exercise::create(conn, data))?;
        self.publish(ChangedTable::Exercises, &data.user_id);
        Ok(exercise)
    }

    /// Merge day metrics and notify subscribers
    pub fn record_day_metrics(
        &self,
        user_id: &str,
        date: &str,
        data: &DayMetricsUpdate,
    ) -> DbResult<DayMetrics> {
        let metrics = self
            .database
            .with_conn(|conn| DayMetrics::upsert(conn, user_id, date, data))?;
        self.publish(ChangedTable::DayMetrics, user_id);
        Ok(metrics)
    }

    /// Save the user's targets and notify subscribers
    pub fn save_profile(&self, profile: &UserProfile) -> DbResult<UserProfile> {
        let saved = self.database.with_conn(|conn| UserProfile::save(conn, profile))?;
        self.publish(ChangedTable::UserProfiles, &profile.user_id);
        Ok(saved)
    }

    pub fn load_profile(&self, user_id: &str) -> DbResult<UserProfile> {
        self.database
            .with_conn(|conn| UserProfile::get_or_default(conn, user_id))
    }
}

#[async_trait]
impl DataAccess for SqliteStore {
    async fn daily_log(&self, user_id: &str, date: NaiveDate) -> Result<DailyLog, DataAccessError> {
        let database = self.database.clone();
        let user_id = user_id.to_string();
        let log = tokio::task::spawn_blocking(move || {
            database.with_conn(|conn| DailyLog::assemble(conn, &user_id, date))
        })
        .await??;
        Ok(log)
    }

    async fn profile(&self, user_id: &str) -> Result<UserProfile, DataAccessError> {
        let store = self.clone();
        let user_id = user_id.to_string();
        let profile = tokio::task::spawn_blocking(move || store.load_profile(&user_id)).await??;
        Ok(profile)
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }
}
