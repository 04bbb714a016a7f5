//! Ordered reading series and the tail-replacement merge.
//!
//! A [`Series`] holds readings with strictly increasing timestamps. Every
//! constructor normalizes its input, so the invariant also holds for series
//! deserialized from a store that another process may have written.

use serde::{Deserialize, Serialize};

use crate::error::SeriesError;
use crate::reading::{Reading, Timestamp};

/// Ordered sequence of readings for one measure, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Reading>", into = "Vec<Reading>")]
pub struct Series(Vec<Reading>);

/// Time and value bounds of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesLimits {
    pub min_time: Timestamp,
    pub max_time: Timestamp,
    pub min_value: f64,
    pub max_value: f64,
}

impl Series {
    /// Create an empty series.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a series from readings in any order.
    ///
    /// Readings are stably sorted by timestamp; for equal timestamps the one
    /// appearing last wins.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        Self(normalize(readings))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Reading> {
        self.0
    }

    pub fn first(&self) -> Option<&Reading> {
        self.0.first()
    }

    /// The most recent reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.0.last()
    }

    /// Readings with `timestamp >= since`.
    pub fn since(&self, since: Timestamp) -> &[Reading] {
        let start = self.0.partition_point(|r| r.timestamp < since);
        &self.0[start..]
    }

    /// Owned copy of [`Series::since`].
    pub fn window(&self, since: Timestamp) -> Series {
        Series(self.since(since).to_vec())
    }

    /// Merge `incoming` into a copy of this series.
    ///
    /// See [`Series::merge_in_place`] for the replacement rule.
    pub fn merge(&self, incoming: &Series) -> Series {
        let mut merged = self.clone();
        merged.merge_in_place(incoming);
        merged
    }

    /// Replace the tail of this series with `incoming`.
    ///
    /// Every reading at or after `incoming`'s first timestamp is discarded and
    /// all of `incoming` is appended. If `incoming` starts before this series
    /// does, the whole series is replaced. An empty `incoming` is a no-op.
    pub fn merge_in_place(&mut self, incoming: &Series) {
        let Some(first) = incoming.0.first() else {
            return;
        };
        let keep = self
            .0
            .iter()
            .rposition(|r| r.timestamp < first.timestamp)
            .map_or(0, |index| index + 1);
        self.0.truncate(keep);
        self.0.extend_from_slice(&incoming.0);
    }

    /// Drop leading readings older than `horizon`, returning how many went.
    pub fn evict_before(&mut self, horizon: Timestamp) -> usize {
        let cut = self.0.partition_point(|r| r.timestamp < horizon);
        self.0.drain(..cut);
        cut
    }

    /// Time and value bounds; an empty series has none.
    pub fn limits(&self) -> Result<SeriesLimits, SeriesError> {
        let (first, last) = match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SeriesError::Empty),
        };
        let mut min_value = f64::INFINITY;
        let mut max_value = f64::NEG_INFINITY;
        for reading in &self.0 {
            min_value = min_value.min(reading.value);
            max_value = max_value.max(reading.value);
        }
        Ok(SeriesLimits {
            min_time: first.timestamp,
            max_time: last.timestamp,
            min_value,
            max_value,
        })
    }
}

fn normalize(mut readings: Vec<Reading>) -> Vec<Reading> {
    if readings.windows(2).all(|w| w[0].timestamp < w[1].timestamp) {
        return readings;
    }
    readings.sort_by_key(|r| r.timestamp);
    let mut out: Vec<Reading> = Vec::with_capacity(readings.len());
    for reading in readings {
        match out.last_mut() {
            Some(last) if last.timestamp == reading.timestamp => *last = reading,
            _ => out.push(reading),
        }
    }
    out
}

impl From<Vec<Reading>> for Series {
    fn from(readings: Vec<Reading>) -> Self {
        Self::from_readings(readings)
    }
}

impl From<Series> for Vec<Reading> {
    fn from(series: Series) -> Self {
        series.0
    }
}

impl FromIterator<Reading> for Series {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::from_readings(iter.into_iter().collect())
    }
}

impl FromIterator<(Timestamp, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (Timestamp, f64)>>(iter: I) -> Self {
        iter.into_iter().map(Reading::from).collect()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
