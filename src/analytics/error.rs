//! Analytics errors

use chrono::NaiveDate;
use thiserror::Error;

use crate::store::DataAccessError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown time range '{0}'")]
    UnknownRange(String),

    #[error("Failed to fetch daily log for {date}: {source}")]
    Fetch {
        date: NaiveDate,
        #[source]
        source: DataAccessError,
    },

    #[error("Failed to load profile: {0}")]
    Profile(#[source] DataAccessError),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
