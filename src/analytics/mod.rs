//! Nutrition analytics pipeline
//!
//! Range resolution, batched fetch, bucket aggregation, and the statistics and
//! correlation calculators built on top of them.

pub mod aggregate;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod range;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{aggregate, qualifying_days, AnalyticsDataPoint, MIN_QUALIFYING_DAYS};
pub use correlation::{
    correlations, impacts, pearson, CorrelationResult, Correlations, Impacts,
};
pub use engine::{AnalyticsEngine, AnalyticsQuery, AnalyticsReport};
pub use error::{AnalyticsError, AnalyticsResult};
pub use fetch::fetch_daily_logs;
pub use range::{resolve_range, Granularity, ResolvedRange, TimeRange};
pub use stats::{goal_achievement, summarize, weekly_pattern, GoalAchievement, StatsSummary, WeeklyPattern};
