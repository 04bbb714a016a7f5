//! RiverData Storage - Key-Value Stores and the Reading Cache
//!
//! Persistence for cached readings ([`InMemoryStore`], [`LmdbStore`]) and
//! the read-through [`ReadingCache`] that fetches, merges, throttles and
//! evicts measure readings.

pub mod cache;
pub mod store;

pub use cache::{
    CacheConfig, CacheRead, CacheStats, Freshness, ReadingCache, ReadingsKey, ReadingsQuery,
    READINGS_PREFIX,
};
pub use store::{
    InMemoryStore, KeyValueStore, KeyValueStoreExt, LmdbStore, LmdbStoreError, DEFAULT_NAMESPACE,
    MAX_STORE_SIZE_MB,
};
