/// Counters for reading cache activity since the cache was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered without a remote fetch.
    pub hits: u64,
    /// Reads that needed a remote fetch.
    pub misses: u64,
    /// Remote fetches that completed successfully.
    pub fetches: u64,
    /// Readings dropped by retention eviction.
    pub evicted_readings: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
