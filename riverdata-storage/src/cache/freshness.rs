//! Freshness requirements and cache read results.
//!
//! Callers choose how stale cached readings may be; every read reports
//! whether it was served from the cache and when the source was last asked.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// How fresh cached readings must be before a remote fetch is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Skip the fetch while the last check is younger than the configured
    /// throttle interval.
    #[default]
    Throttled,

    /// Skip the fetch while the last check is younger than the given age.
    MaxStaleness(Duration),

    /// Always ask the remote source.
    Refresh,
}

impl Freshness {
    /// Maximum age of the last check that still counts as fresh.
    ///
    /// `throttle_interval` is the configured default used by
    /// [`Freshness::Throttled`].
    pub fn max_age(&self, throttle_interval: Duration) -> Duration {
        match self {
            Self::Throttled => throttle_interval,
            Self::MaxStaleness(max) => *max,
            Self::Refresh => Duration::ZERO,
        }
    }

    pub fn is_refresh(&self) -> bool {
        matches!(self, Self::Refresh)
    }
}

/// Result of a cache read, carrying staleness metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    /// The value read.
    value: T,
    /// When the remote source was last checked for this value.
    checked_at: DateTime<Utc>,
    /// Whether the remote fetch was skipped.
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// A read served from cached data last checked at `checked_at`.
    pub fn from_cache(value: T, checked_at: DateTime<Utc>) -> Self {
        Self {
            value,
            checked_at,
            was_cache_hit: true,
        }
    }

    /// A read that went to the remote source at `checked_at`.
    pub fn from_source(value: T, checked_at: DateTime<Utc>) -> Self {
        Self {
            value,
            checked_at,
            was_cache_hit: false,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Get a reference to the underlying value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the remote source was last checked.
    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Time since the remote source was last checked.
    pub fn staleness(&self) -> Duration {
        (Utc::now() - self.checked_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }
}
