//! Read-through reading cache.
//!
//! The cache owns every `readings|<measureId>` key in the store. Reads are
//! throttled per measure and report their freshness through [`CacheRead`].
//!
//! # Example
//!
//! ```ignore
//! // Default read: throttled by the configured interval
//! let series = cache.get_measure_readings(measure_id, Some(since)).await?;
//!
//! // Caller can inspect staleness
//! let read = cache.read_measure(measure_id, ReadingsQuery::since(since)).await?;
//! if read.staleness() > Duration::from_secs(30 * 60) {
//!     tracing::warn!("Readings are getting stale");
//! }
//! ```

pub mod freshness;
pub mod key;
pub mod read_through;
pub mod stats;

pub use freshness::{CacheRead, Freshness};
pub use key::{ReadingsKey, READINGS_PREFIX};
pub use read_through::{CacheConfig, ReadingCache, ReadingsQuery};
pub use stats::CacheStats;
