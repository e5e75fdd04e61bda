//! Data access
//!
//! The analytics pipeline reads through [`DataAccess`]: one lookup for the
//! aggregated log of a date, one for the user's targets, and a change feed
//! used only to invalidate cached results.

mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::db::DbError;
use crate::models::{DailyLog, UserProfile};

pub use sqlite::SqliteStore;

/// Source tables that emit change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedTable {
    Meals,
    Exercises,
    DayMetrics,
    UserProfiles,
}

/// "Rows changed in table T for user U"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableChange {
    pub table: ChangedTable,
    pub user_id: String,
}

/// Errors raised by a data access backend
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Read side of the backing store
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Aggregated log for one date; an untracked date is an empty log, not an error
    async fn daily_log(&self, user_id: &str, date: NaiveDate) -> Result<DailyLog, DataAccessError>;

    /// The user's targets, falling back to defaults
    async fn profile(&self, user_id: &str) -> Result<UserProfile, DataAccessError>;

    /// Subscribe to row-change notifications
    fn subscribe_changes(&self) -> broadcast::Receiver<TableChange>;
}
