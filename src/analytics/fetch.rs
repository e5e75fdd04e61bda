//! Batched fetch orchestration
//!
//! Lookups inside a batch run concurrently; batches run one after another so
//! the backend never sees more than `batch_size` requests at once.

use std::time::Duration;

use chrono::NaiveDate;
use futures_util::future::try_join_all;
use tracing::{debug, warn};

use crate::models::DailyLog;
use crate::store::DataAccess;
use super::error::{AnalyticsError, AnalyticsResult};

/// Pause before the first retry; doubles per attempt up to [`MAX_RETRY_BACKOFF`]
pub const RETRY_BACKOFF: Duration = Duration::from_millis(50);
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Fetch the log of every date, preserving input order.
///
/// The first failing lookup aborts the whole fetch; nothing partial is
/// returned. Each lookup is tried `attempts` times (minimum one), with a
/// growing pause between tries.
pub async fn fetch_daily_logs<S>(
    source: &S,
    user_id: &str,
    dates: &[NaiveDate],
    batch_size: usize,
    attempts: u32,
) -> AnalyticsResult<Vec<DailyLog>>
where
    S: DataAccess + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut logs = Vec::with_capacity(dates.len());

    for (index, batch) in dates.chunks(batch_size).enumerate() {
        debug!(
            user_id,
            batch = index,
            size = batch.len(),
            first = %batch[0],
            "fetching daily log batch"
        );

        let lookups = batch
            .iter()
            .map(|&date| fetch_one(source, user_id, date, attempts));
        let mut fetched = try_join_all(lookups).await?;
        logs.append(&mut fetched);
    }

    Ok(logs)
}

async fn fetch_one<S>(
    source: &S,
    user_id: &str,
    date: NaiveDate,
    attempts: u32,
) -> AnalyticsResult<DailyLog>
where
    S: DataAccess + ?Sized,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    let mut backoff = RETRY_BACKOFF;
    loop {
        match source.daily_log(user_id, date).await {
            Ok(log) => return Ok(log),
            Err(e) if attempt < attempts => {
                warn!(
                    user_id,
                    %date,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "daily log lookup failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_RETRY_BACKOFF);
                attempt += 1;
            }
            Err(source) => return Err(AnalyticsError::Fetch { date, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::MemorySource;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2026, 10, d).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_preserves_order_across_batches() {
        let source = MemorySource::new();
        let wanted = dates(7);

        let logs = fetch_daily_logs(&source, "ana", &wanted, 3, 1).await.unwrap();

        let got: Vec<NaiveDate> = logs.iter().map(|l| l.date).collect();
        assert_eq!(got, wanted);
    }

    #[tokio::test]
    async fn test_concurrent_within_batch_sequential_across() {
        let source = MemorySource::new().with_latency_ms(5);

        fetch_daily_logs(&source, "ana", &dates(7), 3, 1).await.unwrap();

        assert_eq!(source.max_in_flight(), 3);
        assert_eq!(source.requested().len(), 7);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_batches() {
        let all = dates(9);
        let source = MemorySource::new().failing_on(all[4]);

        let err = fetch_daily_logs(&source, "ana", &all, 3, 1).await.unwrap_err();

        match err {
            AnalyticsError::Fetch { date, .. } => assert_eq!(date, all[4]),
            other => panic!("unexpected error: {other}"),
        }
        let requested = source.requested();
        assert!(!requested.contains(&all[6]));
        assert!(!requested.contains(&all[8]));
    }

    #[tokio::test]
    async fn test_retries_up_to_attempts() {
        let all = dates(2);
        let flaky = MemorySource::new().failing_times(all[1], 2);
        let err = fetch_daily_logs(&flaky, "ana", &all, 50, 2).await;
        assert!(err.is_err());

        let flaky = MemorySource::new().failing_times(all[1], 2);
        let logs = fetch_daily_logs(&flaky, "ana", &all, 50, 3).await.unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn test_retries_pause_between_attempts() {
        let all = dates(1);
        let flaky = MemorySource::new().failing_times(all[0], 2);

        let started = std::time::Instant::now();
        let logs = fetch_daily_logs(&flaky, "ana", &all, 50, 3).await.unwrap();
        assert_eq!(logs.len(), 1);
        // 50 ms then 100 ms
        assert!(started.elapsed() >= RETRY_BACKOFF * 3);
        assert_eq!(flaky.requested().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_dates_make_no_requests() {
        let source = MemorySource::new();
        let logs = fetch_daily_logs(&source, "ana", &[], 50, 1).await.unwrap();
        assert!(logs.is_empty());
        assert!(source.requested().is_empty());
    }
}
