//! Read-through cache for measure readings.
//!
//! Each read loads the measure's [`CacheEntry`], evicts readings older than
//! the retention horizon, and decides whether the remote source must be
//! asked. A fetch starts at the later of the requested start and the newest
//! reading already held, is merged into the entry and persisted. A throttled
//! read only returns the cached window.
//!
//! At most one read per measure id runs at a time. Reads for different
//! measures proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use riverdata_core::{
    parse_readings, start_of_day, CacheEntry, ConfigError, DayAlignment, RiverDataResult,
    ReadingSource, Series, Timestamp,
};
use tokio::sync::Mutex;

use super::freshness::{CacheRead, Freshness};
use super::key::ReadingsKey;
use super::stats::CacheStats;
use crate::store::{KeyValueStore, KeyValueStoreExt};

/// Configuration for the reading cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whole days of readings kept before the current day.
    pub retention_days: u32,
    /// Minimum spacing between remote fetches for one measure.
    pub throttle_interval: Duration,
    /// Which midnight the retention horizon is aligned to.
    pub day_alignment: DayAlignment,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retention_days: 8,
            throttle_interval: Duration::from_secs(15 * 60),
            day_alignment: DayAlignment::Local,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retention window in days.
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Set the throttle interval.
    pub fn with_throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    /// Set the day alignment of the retention horizon.
    pub fn with_day_alignment(mut self, alignment: DayAlignment) -> Self {
        self.day_alignment = alignment;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retention_days".to_string(),
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Oldest timestamp a cached series may keep at `now`.
    pub fn retention_horizon(&self, now: DateTime<Utc>) -> Timestamp {
        start_of_day(now, -i64::from(self.retention_days), self.day_alignment)
    }
}

/// Options for a single cache read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingsQuery {
    /// Only readings at or after this timestamp are returned. `None` means 0.
    pub since: Option<Timestamp>,
    /// How stale the cached readings may be.
    pub freshness: Freshness,
}

impl ReadingsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readings at or after `since`.
    pub fn since(since: Timestamp) -> Self {
        Self {
            since: Some(since),
            ..Self::default()
        }
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }
}

/// Read-through cache of measure readings.
///
/// # Type Parameters
///
/// - `S`: the key-value store holding `readings|*` entries
/// - `R`: the remote reading source
///
/// # Example
///
/// ```ignore
/// let cache = ReadingCache::new(Arc::new(store), Arc::new(client), CacheConfig::default());
/// let week = start_of_day(Utc::now(), -7, DayAlignment::Local);
/// let series = cache.get_measure_readings("3400TH-flow--i-15_min-m3_s", Some(week)).await?;
/// ```
pub struct ReadingCache<S, R>
where
    S: KeyValueStore + ?Sized,
    R: ReadingSource + ?Sized,
{
    /// Persistent entries.
    store: Arc<S>,
    /// Remote reading source.
    source: Arc<R>,
    /// Cache configuration.
    config: CacheConfig,
    /// One lock per measure id with a read in progress.
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    stats: StdMutex<CacheStats>,
}

impl<S, R> ReadingCache<S, R>
where
    S: KeyValueStore + ?Sized,
    R: ReadingSource + ?Sized,
{
    /// Create a new reading cache.
    pub fn new(store: Arc<S>, source: Arc<R>, config: CacheConfig) -> Self {
        Self {
            store,
            source,
            config,
            in_flight: Mutex::new(HashMap::new()),
            stats: StdMutex::new(CacheStats::default()),
        }
    }

    /// Create a new reading cache with default configuration.
    pub fn with_defaults(store: Arc<S>, source: Arc<R>) -> Self {
        Self::new(store, source, CacheConfig::default())
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Readings for `measure_id` at or after `since` (default 0).
    ///
    /// Fetches from the remote source unless the cached entry already covers
    /// `since` and was checked within the throttle interval. A failed fetch
    /// propagates and leaves the stored entry untouched.
    pub async fn get_measure_readings(
        &self,
        measure_id: &str,
        since: Option<Timestamp>,
    ) -> RiverDataResult<Series> {
        let query = ReadingsQuery {
            since,
            ..ReadingsQuery::default()
        };
        Ok(self.read_measure(measure_id, query).await?.into_value())
    }

    /// Like [`ReadingCache::get_measure_readings`], reporting whether the
    /// remote source was asked.
    pub async fn read_measure(
        &self,
        measure_id: &str,
        query: ReadingsQuery,
    ) -> RiverDataResult<CacheRead<Series>> {
        let key = ReadingsKey::new(measure_id)?;

        let slot = self.acquire_slot(measure_id).await;
        let result = {
            let _guard = slot.lock().await;
            self.read_locked(&key, query, Utc::now()).await
        };
        self.release_slot(measure_id, slot).await;

        result
    }

    async fn read_locked(
        &self,
        key: &ReadingsKey,
        query: ReadingsQuery,
        now: DateTime<Utc>,
    ) -> RiverDataResult<CacheRead<Series>> {
        let requested_since = query.since.unwrap_or(0);
        let mut entry: CacheEntry = self.store.get_as(key.as_str())?.unwrap_or_default();

        let evicted = entry.evict_before(self.config.retention_horizon(now));
        if evicted > 0 {
            tracing::debug!(measure_id = key.measure_id(), evicted, "Evicted readings past retention");
            self.record(|stats| stats.evicted_readings += evicted as u64);
        }

        if self.is_fresh(&entry, requested_since, query.freshness, now) {
            tracing::debug!(
                measure_id = key.measure_id(),
                last_checked_at = entry.last_checked_at,
                "Serving cached readings"
            );
            self.record(|stats| stats.hits += 1);
            let checked_at = DateTime::from_timestamp(entry.last_checked_at, 0).unwrap_or(now);
            return Ok(CacheRead::from_cache(entry.data.window(requested_since), checked_at));
        }
        self.record(|stats| stats.misses += 1);

        // Never re-fetch readings already held.
        let fetch_from = entry
            .last_timestamp()
            .map_or(requested_since, |last| last.max(requested_since));
        let since = (fetch_from > 0).then_some(fetch_from);

        let events = self
            .source
            .fetch_measure_readings(key.measure_id(), since)
            .await?;
        let incoming = parse_readings(&events)
            .remove(key.measure_id())
            .unwrap_or_default();

        entry.data.merge_in_place(&incoming);
        entry.extend_coverage(requested_since);
        entry.last_checked_at = now.timestamp();
        self.store.set_as(key.as_str(), &entry)?;
        self.record(|stats| stats.fetches += 1);

        tracing::info!(
            measure_id = key.measure_id(),
            since = ?since,
            fetched = incoming.len(),
            cached = entry.data.len(),
            "Fetched readings"
        );

        Ok(CacheRead::from_source(entry.data.window(requested_since), now))
    }

    fn is_fresh(
        &self,
        entry: &CacheEntry,
        requested_since: Timestamp,
        freshness: Freshness,
        now: DateTime<Utc>,
    ) -> bool {
        if freshness.is_refresh() || !entry.covers(requested_since) {
            return false;
        }
        let max_age = freshness.max_age(self.config.throttle_interval);
        let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        now.timestamp() - entry.last_checked_at < max_age
    }

    /// Get (or create) the lock for `measure_id`.
    async fn acquire_slot(&self, measure_id: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry(measure_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the lock for `measure_id` once no other read holds it.
    async fn release_slot(&self, measure_id: &str, slot: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&slot) <= 2 {
            in_flight.remove(measure_id);
        }
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut stats);
    }

    /// Counters since the cache was built.
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Measure ids with a stored entry, sorted.
    pub fn cached_measures(&self) -> RiverDataResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .store
            .keys()?
            .iter()
            .filter_map(|raw| ReadingsKey::parse(raw))
            .map(|key| key.measure_id().to_string())
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// The stored entry for `measure_id`, as persisted.
    pub fn entry(&self, measure_id: &str) -> RiverDataResult<Option<CacheEntry>> {
        let key = ReadingsKey::new(measure_id)?;
        self.store.get_as(key.as_str())
    }

    /// Remove the stored entry for `measure_id`. Returns false if none existed.
    pub async fn invalidate(&self, measure_id: &str) -> RiverDataResult<bool> {
        let key = ReadingsKey::new(measure_id)?;
        let slot = self.acquire_slot(measure_id).await;
        let removed = {
            let _guard = slot.lock().await;
            self.store.unset(key.as_str())
        };
        self.release_slot(measure_id, slot).await;

        if let Ok(true) = removed {
            tracing::debug!(measure_id, "Invalidated cached readings");
        }
        removed
    }

    /// Remove every `readings|*` entry, leaving other keys alone.
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate_all(&self) -> RiverDataResult<u64> {
        let mut removed = 0;
        for measure_id in self.cached_measures()? {
            if self.invalidate(&measure_id).await? {
                removed += 1;
            }
        }
        tracing::info!(removed, "Invalidated all cached readings");
        Ok(removed)
    }
}
