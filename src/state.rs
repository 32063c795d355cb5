//! Session-scoped cache of the signed-in user's readings for the current week.
//!
//! The cache starts `Uninitialized`, serves the persisted record when it was
//! fetched during the current week, and otherwise fetches the week from the
//! backend. Every fetch and merge takes a ticket from a shared counter before
//! it awaits anything. A fetch response is dropped if a newer fetch already
//! landed; merges newer than the applied fetch are replayed on top of it.

use crate::errors::FetchResult;
use crate::filters::{same_week, week_filter};
use crate::models::{CacheRecord, NewReading, Reading, ReadingSet};
use crate::repository::{Credentials, ReadingRepository};
use crate::storage::CacheStore;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    Uninitialized,
    Ready,
    Degraded { message: String },
}

#[derive(Debug)]
struct CacheInner {
    status: CacheStatus,
    reading_set: ReadingSet,
    todays_readings: Vec<Reading>,
    last_fetched_at: Option<NaiveDateTime>,
    applied_fetch: u64,
    // Merged readings not yet known to be part of an applied snapshot, oldest first.
    merged: Vec<(u64, Reading)>,
}

impl CacheInner {
    fn empty() -> Self {
        Self {
            status: CacheStatus::Uninitialized,
            reading_set: ReadingSet::default(),
            todays_readings: Vec::new(),
            last_fetched_at: None,
            applied_fetch: 0,
            merged: Vec::new(),
        }
    }

    fn replace(&mut self, reading_set: ReadingSet, today: NaiveDate) {
        self.todays_readings = reading_set.readings_on(today);
        self.reading_set = reading_set;
    }

    /// Installs a week snapshot and replays the merges it may be missing.
    ///
    /// A server fetch already contains every reading uploaded before it was
    /// issued, so merges older than its ticket are dropped. A disk snapshot
    /// gives no such guarantee and keeps them all.
    fn apply_snapshot(
        &mut self,
        ticket: u64,
        mut reading_set: ReadingSet,
        fetched_at: NaiveDateTime,
        today: NaiveDate,
        from_server: bool,
    ) {
        self.applied_fetch = ticket;
        if from_server {
            self.merged.retain(|(merged_at, _)| *merged_at > ticket);
        }
        for (_, reading) in &self.merged {
            reading_set.insert_newest(reading.clone());
        }
        self.replace(reading_set, today);
        self.last_fetched_at = Some(fetched_at);
        self.status = CacheStatus::Ready;
    }

    fn record(&self) -> Option<CacheRecord> {
        self.last_fetched_at.map(|last_fetched_at| CacheRecord {
            reading_set: self.reading_set.clone(),
            last_fetched_at,
        })
    }
}

#[derive(Clone)]
pub struct LocalDataCache {
    repository: ReadingRepository,
    store: CacheStore,
    credentials: Credentials,
    inner: Arc<Mutex<CacheInner>>,
    tickets: Arc<AtomicU64>,
}

impl LocalDataCache {
    pub fn new(repository: ReadingRepository, store: CacheStore, credentials: Credentials) -> Self {
        Self {
            repository,
            store,
            credentials,
            inner: Arc::new(Mutex::new(CacheInner::empty())),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub async fn initialize(&self) -> CacheStatus {
        self.initialize_at(Local::now().naive_local()).await
    }

    /// Serves a persisted record from this week, or fetches the week.
    pub async fn initialize_at(&self, now: NaiveDateTime) -> CacheStatus {
        if let Some(record) = self.store.load().await {
            if same_week(record.last_fetched_at.date(), now.date()) {
                let ticket = self.next_ticket();
                let mut inner = self.inner.lock().await;
                if ticket > inner.applied_fetch {
                    info!(
                        readings = record.reading_set.readings.len(),
                        "serving readings from this week's cache"
                    );
                    inner.apply_snapshot(
                        ticket,
                        record.reading_set,
                        record.last_fetched_at,
                        now.date(),
                        false,
                    );
                }
                return inner.status.clone();
            }
            debug!(last_fetched_at = %record.last_fetched_at, "cached readings are stale");
        }

        // The failure is already reflected in the returned status.
        let _ = self.refresh_at(now).await;
        self.status().await
    }

    pub async fn refresh(&self) -> FetchResult<()> {
        self.refresh_at(Local::now().naive_local()).await
    }

    /// Fetches the week containing `now` and replaces the cached set.
    pub async fn refresh_at(&self, now: NaiveDateTime) -> FetchResult<()> {
        let ticket = self.next_ticket();
        let filters = week_filter(now.date());
        let result = self
            .repository
            .fetch_readings(&self.credentials, Some(&filters))
            .await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(reading_set) => {
                if ticket <= inner.applied_fetch {
                    debug!(ticket, applied = inner.applied_fetch, "discarding superseded fetch");
                    return Ok(());
                }
                inner.apply_snapshot(ticket, reading_set, now, now.date(), true);
                if let Some(record) = inner.record() {
                    self.persist(&record).await;
                }
                Ok(())
            }
            Err(failure) => {
                warn!("failed to refresh readings: {failure}");
                if ticket > inner.applied_fetch {
                    inner.status = CacheStatus::Degraded {
                        message: failure.message.clone(),
                    };
                }
                Err(failure)
            }
        }
    }

    pub async fn record_submission(&self, reading: Reading) {
        self.record_submission_at(reading, Local::now().naive_local())
            .await
    }

    /// Merges a reading the server just stored into the cached week.
    pub async fn record_submission_at(&self, reading: Reading, now: NaiveDateTime) {
        let ticket = self.next_ticket();
        let mut inner = self.inner.lock().await;
        inner.merged.push((ticket, reading.clone()));
        let mut reading_set = std::mem::take(&mut inner.reading_set);
        if !reading_set.insert_newest(reading) {
            debug!("reading already cached");
        }
        inner.replace(reading_set, now.date());
        match inner.record() {
            Some(record) => self.persist(&record).await,
            None => debug!("cache never fetched, keeping merge in memory only"),
        }
    }

    pub async fn submit_reading(&self, reading: &NewReading) -> FetchResult<Reading> {
        self.submit_reading_at(reading, Local::now().naive_local())
            .await
    }

    /// Uploads a reading and merges the stored copy before returning.
    pub async fn submit_reading_at(
        &self,
        reading: &NewReading,
        now: NaiveDateTime,
    ) -> FetchResult<Reading> {
        let stored = self
            .repository
            .upload_reading(reading, &self.credentials)
            .await?;
        self.record_submission_at(stored.clone(), now).await;
        Ok(stored)
    }

    pub async fn status(&self) -> CacheStatus {
        self.inner.lock().await.status.clone()
    }

    pub async fn reading_set(&self) -> ReadingSet {
        self.inner.lock().await.reading_set.clone()
    }

    pub async fn todays_readings(&self) -> Vec<Reading> {
        self.inner.lock().await.todays_readings.clone()
    }

    pub async fn last_fetched_at(&self) -> Option<NaiveDateTime> {
        self.inner.lock().await.last_fetched_at
    }

    /// Forgets everything, on disk and in memory. Used on sign-out.
    pub async fn teardown(&self) -> std::io::Result<()> {
        let ticket = self.next_ticket();
        let mut inner = self.inner.lock().await;
        *inner = CacheInner::empty();
        inner.applied_fetch = ticket;
        self.store.clear().await
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn persist(&self, record: &CacheRecord) {
        if let Err(err) = self.store.persist(record).await {
            error!("failed to persist cached readings: {err}");
        }
    }
}
