//! In-memory data access for pipeline tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::models::{DailyLog, UserProfile};
use crate::store::{DataAccess, DataAccessError, TableChange};

pub struct MemorySource {
    logs: HashMap<NaiveDate, DailyLog>,
    profile: UserProfile,
    remaining_failures: Mutex<HashMap<NaiveDate, u32>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requested: Mutex<Vec<NaiveDate>>,
    changes: broadcast::Sender<TableChange>,
}

impl MemorySource {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            logs: HashMap::new(),
            profile: UserProfile::default_for("ana"),
            remaining_failures: Mutex::new(HashMap::new()),
            latency: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
            changes,
        }
    }

    pub fn with_logs(mut self, logs: Vec<DailyLog>) -> Self {
        self.logs = logs.into_iter().map(|l| (l.date, l)).collect();
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_latency_ms(mut self, ms: u64) -> Self {
        self.latency = Some(Duration::from_millis(ms));
        self
    }

    pub fn failing_on(self, date: NaiveDate) -> Self {
        self.failing_times(date, u32::MAX)
    }

    pub fn failing_times(self, date: NaiveDate, times: u32) -> Self {
        self.remaining_failures.lock().unwrap().insert(date, times);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<NaiveDate> {
        self.requested.lock().unwrap().clone()
    }

    pub fn notify(&self, change: TableChange) {
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl DataAccess for MemorySource {
    async fn daily_log(&self, _user_id: &str, date: NaiveDate) -> Result<DailyLog, DataAccessError> {
        self.requested.lock().unwrap().push(date);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        {
            let mut failures = self.remaining_failures.lock().unwrap();
            if let Some(left) = failures.get_mut(&date) {
                if *left > 0 {
                    *left -= 1;
                    return Err(DataAccessError::Unavailable(format!("no response for {}", date)));
                }
            }
        }

        Ok(self
            .logs
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailyLog::empty(date)))
    }

    async fn profile(&self, _user_id: &str) -> Result<UserProfile, DataAccessError> {
        Ok(self.profile.clone())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }
}

/// Day log with the fields most tests care about
pub fn day(date: NaiveDate, calories: f64, protein: f64) -> DailyLog {
    let mut log = DailyLog::empty(date);
    log.calories_consumed = calories;
    log.net_calories = calories;
    log.protein = protein;
    log
}
