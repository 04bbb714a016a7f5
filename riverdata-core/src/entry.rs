//! Persisted cache entry for one measure.

use serde::{Deserialize, Serialize};

use crate::reading::Timestamp;
use crate::series::Series;

/// Cached readings for one measure plus the bookkeeping that drives
/// throttling and coverage decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Readings held for the measure, oldest first.
    pub data: Series,
    /// When the remote source was last queried successfully (Unix seconds).
    pub last_checked_at: Timestamp,
    /// The timestamp from which `data` is known to be complete.
    ///
    /// `None` stands for +∞: nothing is known to be covered yet.
    pub earliest_coverage: Option<Timestamp>,
}

impl CacheEntry {
    /// True when the entry is known to cover everything from `since` onward.
    pub fn covers(&self, since: Timestamp) -> bool {
        self.earliest_coverage.is_some_and(|coverage| coverage <= since)
    }

    /// Lower the coverage bound to `since` if it is earlier.
    pub fn extend_coverage(&mut self, since: Timestamp) {
        self.earliest_coverage = Some(match self.earliest_coverage {
            Some(coverage) => coverage.min(since),
            None => since,
        });
    }

    /// Drop readings older than `horizon`.
    ///
    /// When readings are dropped, coverage cannot extend past the oldest
    /// survivor; with no survivors it becomes unknown. Returns the number of
    /// readings dropped.
    pub fn evict_before(&mut self, horizon: Timestamp) -> usize {
        let dropped = self.data.evict_before(horizon);
        if dropped > 0 {
            self.earliest_coverage = match (self.data.first(), self.earliest_coverage) {
                (Some(oldest), Some(coverage)) => Some(coverage.max(oldest.timestamp)),
                (Some(oldest), None) => Some(oldest.timestamp),
                (None, _) => None,
            };
        }
        dropped
    }

    /// Timestamp of the newest cached reading.
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.data.latest().map(|r| r.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pairs: &[(i64, f64)], coverage: Option<i64>) -> CacheEntry {
        CacheEntry {
            data: pairs.iter().copied().collect(),
            last_checked_at: 1_000,
            earliest_coverage: coverage,
        }
    }

    #[test]
    fn test_default_covers_nothing() {
        let entry = CacheEntry::default();
        assert!(!entry.covers(0));
        assert!(!entry.covers(i64::MAX));
        assert_eq!(entry.last_checked_at, 0);
    }

    #[test]
    fn test_extend_coverage_takes_minimum() {
        let mut entry = CacheEntry::default();
        entry.extend_coverage(500);
        assert_eq!(entry.earliest_coverage, Some(500));
        entry.extend_coverage(800);
        assert_eq!(entry.earliest_coverage, Some(500));
        entry.extend_coverage(100);
        assert_eq!(entry.earliest_coverage, Some(100));
        assert!(entry.covers(100));
        assert!(!entry.covers(99));
    }

    #[test]
    fn test_evict_raises_coverage_to_oldest_survivor() {
        let mut entry = entry(&[(10, 1.0), (20, 2.0), (30, 3.0)], Some(0));
        assert_eq!(entry.evict_before(15), 1);
        assert_eq!(entry.earliest_coverage, Some(20));
    }

    #[test]
    fn test_evict_nothing_keeps_coverage() {
        let mut entry = entry(&[(10, 1.0)], Some(0));
        assert_eq!(entry.evict_before(5), 0);
        assert_eq!(entry.earliest_coverage, Some(0));
    }

    #[test]
    fn test_evict_all_resets_coverage() {
        let mut entry = entry(&[(10, 1.0), (20, 2.0)], Some(0));
        assert_eq!(entry.evict_before(100), 2);
        assert!(entry.data.is_empty());
        assert_eq!(entry.earliest_coverage, None);
    }

    #[test]
    fn test_serialized_shape() {
        let entry = entry(&[(10, 1.5)], None);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": [[10, 1.5]], "lastCheckedAt": 1000, "earliestCoverage": null})
        );
    }
}
