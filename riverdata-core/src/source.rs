//! The remote reading source seam.

use async_trait::async_trait;

use crate::error::RiverDataResult;
use crate::reading::{RawReadingEvent, Timestamp};

/// Remote source of reading events for a measure.
///
/// Implementations surface network failures and non-2xx statuses as
/// [`crate::TransportError`] and unreadable bodies as
/// [`crate::ParseError::InvalidResponse`]. They must not retry.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch raw events for `measure_id`, newest first.
    ///
    /// With `since = None` the server applies its own lookback window.
    async fn fetch_measure_readings(
        &self,
        measure_id: &str,
        since: Option<Timestamp>,
    ) -> RiverDataResult<Vec<RawReadingEvent>>;
}
