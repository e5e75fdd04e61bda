//! Analytics engine
//!
//! Runs resolve → fetch → aggregate → summarize for a query and caches the
//! report by query identity. Cached reports of a user are dropped whenever
//! the data source announces a change for that user.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::DailyLog;
use crate::store::DataAccess;
use super::aggregate::{aggregate, qualifying_days, AnalyticsDataPoint, MIN_QUALIFYING_DAYS};
use super::correlation::{correlations, impacts, Correlations, Impacts};
use super::error::{AnalyticsError, AnalyticsResult};
use super::fetch::fetch_daily_logs;
use super::range::{resolve_range, Granularity, ResolvedRange, TimeRange};
use super::stats::{
    goal_achievement, summarize, weekly_pattern, GoalAchievement, StatsSummary, WeeklyPattern,
};

/// A range selection as received from a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsQuery {
    pub range: TimeRange,
    /// Custom range start (YYYY-MM-DD)
    pub start: Option<String>,
    /// Custom range end (YYYY-MM-DD)
    pub end: Option<String>,
}

impl AnalyticsQuery {
    pub fn trailing(range: TimeRange) -> Self {
        Self {
            range,
            start: None,
            end: None,
        }
    }

    pub fn custom(start: &str, end: &str) -> Self {
        Self {
            range: TimeRange::Custom,
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }
}

/// Cache identity: user, range tag, and the explicit resolved dates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    user_id: String,
    range: TimeRange,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

/// Everything the presentation layer needs for one query
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub user_id: String,
    pub range: TimeRange,
    pub granularity: Granularity,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub days_fetched: usize,
    pub qualifying_days: usize,
    pub has_enough_data: bool,
    /// Why the report is empty, when it is
    pub message: Option<String>,
    pub points: Vec<AnalyticsDataPoint>,
    pub stats: Option<StatsSummary>,
    pub goals: Option<GoalAchievement>,
    pub weekly: Option<WeeklyPattern>,
    pub correlations: Option<Correlations>,
    pub impacts: Option<Impacts>,
    pub generated_at: String,
}

impl AnalyticsReport {
    fn empty(user_id: &str, resolved: &ResolvedRange, days_fetched: usize, qualifying: usize, message: String) -> Self {
        Self {
            user_id: user_id.to_string(),
            range: resolved.range,
            granularity: resolved.granularity,
            start: resolved.start(),
            end: resolved.end,
            days_fetched,
            qualifying_days: qualifying,
            has_enough_data: false,
            message: Some(message),
            points: Vec::new(),
            stats: None,
            goals: None,
            weekly: None,
            correlations: None,
            impacts: None,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Reports kept before the oldest one is evicted
pub const MAX_CACHED_REPORTS: usize = 128;

struct CachedReport {
    report: Arc<AnalyticsReport>,
    inserted: u64,
}

/// Bounded report cache.
///
/// Trailing ranges resolved against an earlier day are dropped once the day
/// rolls over; past the capacity the oldest insert goes first.
#[derive(Default)]
struct ReportCache {
    entries: HashMap<QueryKey, CachedReport>,
    next_seq: u64,
}

impl ReportCache {
    fn get(&self, key: &QueryKey) -> Option<Arc<AnalyticsReport>> {
        self.entries.get(key).map(|c| Arc::clone(&c.report))
    }

    fn insert(&mut self, key: QueryKey, report: Arc<AnalyticsReport>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= MAX_CACHED_REPORTS {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, c)| c.inserted)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.next_seq += 1;
        self.entries.insert(
            key,
            CachedReport {
                report,
                inserted: self.next_seq,
            },
        );
    }

    fn purge_stale(&mut self, today: NaiveDate) -> usize {
        self.retain(|key| key.range == TimeRange::Custom || key.end.map_or(true, |end| end >= today))
    }

    fn remove_user(&mut self, user_id: &str) -> usize {
        self.retain(|key| key.user_id != user_id)
    }

    fn retain<F: Fn(&QueryKey) -> bool>(&mut self, keep: F) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(key));
        before - self.entries.len()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

type SharedCache = Arc<Mutex<ReportCache>>;

/// Analytics over a [`DataAccess`] backend
#[derive(Clone)]
pub struct AnalyticsEngine {
    source: Arc<dyn DataAccess>,
    fetch_attempts: u32,
    cache: SharedCache,
}

impl AnalyticsEngine {
    pub fn new(source: Arc<dyn DataAccess>, fetch_attempts: u32) -> Self {
        Self {
            source,
            fetch_attempts: fetch_attempts.max(1),
            cache: Arc::new(Mutex::new(ReportCache::default())),
        }
    }

    /// Report for a query, served from cache when possible
    pub async fn report(
        &self,
        user_id: &str,
        query: &AnalyticsQuery,
        today: NaiveDate,
    ) -> AnalyticsResult<Arc<AnalyticsReport>> {
        let resolved = resolve_range(query.range, today, query.start.as_deref(), query.end.as_deref())?;
        let key = QueryKey {
            user_id: user_id.to_string(),
            range: resolved.range,
            start: resolved.start(),
            end: resolved.end,
        };

        {
            let mut cache = self.cache.lock().await;
            let purged = cache.purge_stale(today);
            if purged > 0 {
                debug!(purged, "dropped reports from earlier days");
            }
            if let Some(hit) = cache.get(&key) {
                debug!(user_id, range = resolved.range.as_str(), "analytics cache hit");
                return Ok(hit);
            }
        }

        let report = Arc::new(self.build(user_id, &resolved).await?);
        // Last write wins; a fetch that raced an invalidation may store a stale report.
        self.cache.lock().await.insert(key, Arc::clone(&report));
        Ok(report)
    }

    /// Daily logs for a query without aggregation
    pub async fn daily_logs(
        &self,
        user_id: &str,
        query: &AnalyticsQuery,
        today: NaiveDate,
    ) -> AnalyticsResult<Vec<DailyLog>> {
        let resolved = resolve_range(query.range, today, query.start.as_deref(), query.end.as_deref())?;
        self.fetch(user_id, &resolved).await
    }

    async fn fetch(&self, user_id: &str, resolved: &ResolvedRange) -> AnalyticsResult<Vec<DailyLog>> {
        let dates = resolved.fetch_dates();
        fetch_daily_logs(
            self.source.as_ref(),
            user_id,
            &dates,
            resolved.range.batch_size(),
            self.fetch_attempts,
        )
        .await
    }

    /// Build a report without touching the cache
    pub async fn build(&self, user_id: &str, resolved: &ResolvedRange) -> AnalyticsResult<AnalyticsReport> {
        if resolved.is_empty() {
            return Ok(AnalyticsReport::empty(
                user_id,
                resolved,
                0,
                0,
                "No dates selected. Provide both a start and an end date, start first.".to_string(),
            ));
        }

        let logs = self.fetch(user_id, resolved).await?;
        let days = qualifying_days(&logs);

        if days.len() < MIN_QUALIFYING_DAYS {
            info!(user_id, range = resolved.range.as_str(), qualifying = days.len(), "not enough data for analytics");
            return Ok(AnalyticsReport::empty(
                user_id,
                resolved,
                logs.len(),
                days.len(),
                format!(
                    "Only {} tracked day(s) in this range; at least {} are needed for analytics.",
                    days.len(),
                    MIN_QUALIFYING_DAYS
                ),
            ));
        }

        let profile = self
            .source
            .profile(user_id)
            .await
            .map_err(AnalyticsError::Profile)?;

        let points = aggregate(&logs, resolved.granularity);
        let stats = summarize(&days, &points);
        let goals = goal_achievement(&days, &profile);
        let weekly = weekly_pattern(&days, &profile, resolved.span_days());
        let correlations = correlations(&days);
        let impacts = impacts(&days, &profile);

        info!(
            user_id,
            range = resolved.range.as_str(),
            days = logs.len(),
            qualifying = days.len(),
            buckets = points.len(),
            "analytics report built"
        );

        Ok(AnalyticsReport {
            user_id: user_id.to_string(),
            range: resolved.range,
            granularity: resolved.granularity,
            start: resolved.start(),
            end: resolved.end,
            days_fetched: logs.len(),
            qualifying_days: days.len(),
            has_enough_data: true,
            message: None,
            points,
            stats: Some(stats),
            goals: Some(goals),
            weekly: Some(weekly),
            correlations: Some(correlations),
            impacts: Some(impacts),
            generated_at: Utc::now().to_rfc3339(),
        })
    }

    /// Drop every cached report of a user; returns how many were removed
    pub async fn invalidate_user(&self, user_id: &str) -> usize {
        invalidate(&self.cache, user_id).await
    }

    pub async fn cached_reports(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Listen for source changes and invalidate affected reports
    pub fn start_invalidation(&self) -> JoinHandle<()> {
        let mut changes = self.source.subscribe_changes();
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        let removed = invalidate(&cache, &change.user_id).await;
                        debug!(user_id = %change.user_id, table = ?change.table, removed, "cache invalidated");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "change feed lagged, clearing analytics cache");
                        cache.lock().await.clear();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

async fn invalidate(cache: &SharedCache, user_id: &str) -> usize {
    cache.lock().await.remove_user(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::analytics::testing::{day, MemorySource};
    use crate::models::UserProfile;
    use crate::store::{ChangedTable, TableChange};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn week_ending_today() -> Vec<DailyLog> {
        let calories = [2000.0, 1900.0, 2100.0, 1800.0, 2200.0, 2000.0, 1950.0];
        let protein = [160.0, 150.0, 120.0, 155.0, 100.0, 151.0, 90.0];
        (0..7)
            .map(|i| day(today() - chrono::Duration::days(6 - i as i64), calories[i], protein[i]))
            .collect()
    }

    fn engine_over(source: Arc<MemorySource>) -> AnalyticsEngine {
        AnalyticsEngine::new(source, 1)
    }

    async fn wait_for_cache_size(engine: &AnalyticsEngine, expected: usize) {
        for _ in 0..200 {
            if engine.cached_reports().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("cache never reached {} entries", expected);
    }

    #[tokio::test]
    async fn test_week_report_end_to_end() {
        let mut profile = UserProfile::default_for("ana");
        profile.protein_target = 150.0;
        let source = Arc::new(MemorySource::new().with_logs(week_ending_today()).with_profile(profile));
        let engine = engine_over(source.clone());

        let report = engine
            .report("ana", &AnalyticsQuery::trailing(TimeRange::Week), today())
            .await
            .unwrap();

        assert!(report.has_enough_data);
        assert_eq!(report.points.len(), 7);
        assert_eq!(report.qualifying_days, 7);
        let goals = report.goals.as_ref().unwrap();
        assert_eq!(goals.protein.percentage, 57);
        assert_eq!(goals.protein.days_met, 4);
        assert_eq!(report.stats.as_ref().unwrap().avg_calories, 1993);
        assert_eq!(source.requested().len(), 7);
    }

    #[tokio::test]
    async fn test_single_tracked_day_is_not_enough() {
        let logs = vec![day(today(), 2000.0, 100.0)];
        let source = Arc::new(MemorySource::new().with_logs(logs));
        let engine = engine_over(source);

        let report = engine
            .report("ana", &AnalyticsQuery::trailing(TimeRange::Month), today())
            .await
            .unwrap();

        assert!(!report.has_enough_data);
        assert_eq!(report.days_fetched, 30);
        assert_eq!(report.qualifying_days, 1);
        assert!(report.points.is_empty());
        assert!(report.stats.is_none());
        assert!(report.message.is_some());
    }

    #[tokio::test]
    async fn test_empty_custom_range_skips_fetch() {
        let source = Arc::new(MemorySource::new());
        let engine = engine_over(source.clone());

        let report = engine
            .report("ana", &AnalyticsQuery::custom("2026-10-10", "2026-10-01"), today())
            .await
            .unwrap();

        assert!(!report.has_enough_data);
        assert_eq!(report.days_fetched, 0);
        assert!(source.requested().is_empty());
    }

    #[tokio::test]
    async fn test_year_report_has_month_buckets() {
        let source = Arc::new(MemorySource::new().with_logs(week_ending_today()));
        let engine = engine_over(source.clone());

        let report = engine
            .report("ana", &AnalyticsQuery::trailing(TimeRange::Year), today())
            .await
            .unwrap();

        assert_eq!(report.granularity, Granularity::Month);
        assert_eq!(report.points.len(), 12);
        assert_eq!(report.points[0].label, "Nov 2025");
        assert_eq!(report.points[11].label, "Oct 2026");
        // 2025-11-01 through 2026-10-16
        assert_eq!(source.requested().len(), 350);
        assert_eq!(report.points[11].meals, 0);
        assert_eq!(report.points[0].calories, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let source = Arc::new(
            MemorySource::new()
                .with_logs(week_ending_today())
                .failing_on(today()),
        );
        let engine = engine_over(source);

        let err = engine
            .report("ana", &AnalyticsQuery::trailing(TimeRange::Week), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Fetch { .. }));
        assert_eq!(engine.cached_reports().await, 0);
    }

    #[tokio::test]
    async fn test_repeat_query_served_from_cache() {
        let source = Arc::new(MemorySource::new().with_logs(week_ending_today()));
        let engine = engine_over(source.clone());
        let query = AnalyticsQuery::trailing(TimeRange::Week);

        let first = engine.report("ana", &query, today()).await.unwrap();
        let second = engine.report("ana", &query, today()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.requested().len(), 7);
    }

    #[tokio::test]
    async fn test_change_invalidates_only_that_user() {
        let source = Arc::new(MemorySource::new().with_logs(week_ending_today()));
        let engine = engine_over(source.clone());
        let _listener = engine.start_invalidation();
        let query = AnalyticsQuery::trailing(TimeRange::Week);

        engine.report("ana", &query, today()).await.unwrap();
        engine.report("ben", &query, today()).await.unwrap();
        assert_eq!(engine.cached_reports().await, 2);

        source.notify(TableChange {
            table: ChangedTable::Meals,
            user_id: "ana".into(),
        });
        wait_for_cache_size(&engine, 1).await;

        engine.report("ben", &query, today()).await.unwrap();
        assert_eq!(source.requested().len(), 14);

        engine.report("ana", &query, today()).await.unwrap();
        assert_eq!(source.requested().len(), 21);
    }

    #[tokio::test]
    async fn test_trailing_reports_from_earlier_days_are_dropped() {
        let source = Arc::new(MemorySource::new());
        let engine = engine_over(source);
        let query = AnalyticsQuery::trailing(TimeRange::Week);

        for offset in 0..30 {
            let day = today() + chrono::Duration::days(offset);
            engine.report("ana", &query, day).await.unwrap();
            assert_eq!(engine.cached_reports().await, 1);
        }

        // Custom ranges stay valid after the day rolls over
        engine
            .report("ana", &AnalyticsQuery::custom("2026-10-01", "2026-10-07"), today())
            .await
            .unwrap();
        engine
            .report("ana", &query, today() + chrono::Duration::days(31))
            .await
            .unwrap();
        assert_eq!(engine.cached_reports().await, 2);
    }

    #[tokio::test]
    async fn test_cache_is_bounded() {
        let source = Arc::new(MemorySource::new());
        let engine = engine_over(source.clone());
        let first = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        for offset in 0..(MAX_CACHED_REPORTS as i64 + 20) {
            let date = (first + chrono::Duration::days(offset)).to_string();
            engine
                .report("ana", &AnalyticsQuery::custom(&date, &date), today())
                .await
                .unwrap();
        }
        assert_eq!(engine.cached_reports().await, MAX_CACHED_REPORTS);

        // The oldest entry was evicted, the newest is still served from cache
        let requests = source.requested().len();
        let newest = (first + chrono::Duration::days(MAX_CACHED_REPORTS as i64 + 19)).to_string();
        engine
            .report("ana", &AnalyticsQuery::custom(&newest, &newest), today())
            .await
            .unwrap();
        assert_eq!(source.requested().len(), requests);

        let oldest = first.to_string();
        engine
            .report("ana", &AnalyticsQuery::custom(&oldest, &oldest), today())
            .await
            .unwrap();
        assert_eq!(source.requested().len(), requests + 1);
    }
}
