//! Analytics MCP Tools
//!
//! Read-side tools over the [`AnalyticsEngine`].

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{
    AnalyticsEngine, AnalyticsError, AnalyticsQuery, AnalyticsReport, Correlations, GoalAchievement, Impacts,
    TimeRange, WeeklyPattern,
};
use crate::models::DailyLog;
use super::parse_date;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CorrelationsResponse {
    pub range: TimeRange,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub qualifying_days: usize,
    pub has_enough_data: bool,
    pub message: Option<String>,
    pub correlations: Option<Correlations>,
    pub impacts: Option<Impacts>,
}

#[derive(Debug, Serialize)]
pub struct GoalAchievementResponse {
    pub range: TimeRange,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub qualifying_days: usize,
    pub has_enough_data: bool,
    pub message: Option<String>,
    pub goals: Option<GoalAchievement>,
    pub weekly: Option<WeeklyPattern>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Build a query from tool arguments
pub fn build_query(range: &str, start: Option<String>, end: Option<String>) -> Result<AnalyticsQuery, String> {
    let range = TimeRange::from_str(range)
        .ok_or_else(|| format!("{}, expected 7d, 30d, 3m, 1y or custom", AnalyticsError::UnknownRange(range.to_string())))?;
    Ok(AnalyticsQuery { range, start, end })
}

// ============================================================================
// Analytics Tools
// ============================================================================

/// Full analytics report for a range
pub async fn get_analytics(
    engine: &AnalyticsEngine,
    user_id: &str,
    query: &AnalyticsQuery,
    today: NaiveDate,
) -> Result<Arc<AnalyticsReport>, String> {
    engine
        .report(user_id, query, today)
        .await
        .map_err(|e| format!("Failed to build analytics: {}", e))
}

/// Assembled log for a single date
pub async fn get_daily_log(
    engine: &AnalyticsEngine,
    user_id: &str,
    date: &str,
    today: NaiveDate,
) -> Result<DailyLog, String> {
    let date = parse_date(date)?.to_string();
    let query = AnalyticsQuery::custom(&date, &date);
    let logs = engine
        .daily_logs(user_id, &query, today)
        .await
        .map_err(|e| format!("Failed to load daily log: {}", e))?;
    logs.into_iter()
        .next()
        .ok_or_else(|| format!("No log resolved for {}", date))
}

/// Correlations and goal-aware impact estimates for a range
pub async fn get_correlations(
    engine: &AnalyticsEngine,
    user_id: &str,
    query: &AnalyticsQuery,
    today: NaiveDate,
) -> Result<CorrelationsResponse, String> {
    let report = get_analytics(engine, user_id, query, today).await?;
    Ok(CorrelationsResponse {
        range: report.range,
        start: report.start,
        end: report.end,
        qualifying_days: report.qualifying_days,
        has_enough_data: report.has_enough_data,
        message: report.message.clone(),
        correlations: report.correlations.clone(),
        impacts: report.impacts.clone(),
    })
}

/// Goal achievement and weekly pattern for a range
pub async fn get_goal_achievement(
    engine: &AnalyticsEngine,
    user_id: &str,
    query: &AnalyticsQuery,
    today: NaiveDate,
) -> Result<GoalAchievementResponse, String> {
    let report = get_analytics(engine, user_id, query, today).await?;
    Ok(GoalAchievementResponse {
        range: report.range,
        start: report.start,
        end: report.end,
        qualifying_days: report.qualifying_days,
        has_enough_data: report.has_enough_data,
        message: report.message.clone(),
        goals: report.goals.clone(),
        weekly: report.weekly.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{day, MemorySource};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_build_query() {
        let q = build_query("30d", None, None).unwrap();
        assert_eq!(q.range, TimeRange::Month);
        assert!(build_query("2w", None, None).is_err());
    }

    #[tokio::test]
    async fn test_get_daily_log_single_date() {
        let logged = day(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(), 1750.0, 130.0);
        let engine = AnalyticsEngine::new(Arc::new(MemorySource::new().with_logs(vec![logged.clone()])), 1);

        let log = get_daily_log(&engine, "ana", "2026-10-12", today()).await.unwrap();
        assert_eq!(log, logged);

        assert!(get_daily_log(&engine, "ana", "yesterday", today()).await.is_err());
    }

    #[tokio::test]
    async fn test_correlations_report_insufficient_range() {
        let engine = AnalyticsEngine::new(Arc::new(MemorySource::new()), 1);
        let query = build_query("7d", None, None).unwrap();

        let resp = get_correlations(&engine, "ana", &query, today()).await.unwrap();
        assert!(!resp.has_enough_data);
        assert!(resp.correlations.is_none());
        assert_eq!(resp.qualifying_days, 0);
    }
}
