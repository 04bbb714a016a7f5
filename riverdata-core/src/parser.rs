//! Normalizes raw reading events into per-measure series.

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::reading::{RawReadingEvent, Reading, ReadingsResponse};
use crate::series::Series;
use crate::time::parse_timestamp;

/// Extract the measure id from a measure URL (text after the last `/`).
pub fn measure_id_from_ref(measure_ref: &str) -> &str {
    match measure_ref.rfind('/') {
        Some(index) => &measure_ref[index + 1..],
        None => measure_ref,
    }
}

/// Group raw events by measure id into oldest-first series.
///
/// Upstream delivers newest first. Events without a measure, with an
/// unparseable `dateTime`, or with a `value` that is not a finite number are
/// dropped.
pub fn parse_readings(events: &[RawReadingEvent]) -> BTreeMap<String, Series> {
    let mut grouped: BTreeMap<String, Vec<Reading>> = BTreeMap::new();
    let mut dropped = 0usize;

    for event in events {
        match parse_event(event) {
            Some((measure_id, reading)) => {
                grouped.entry(measure_id.to_string()).or_default().push(reading);
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, total = events.len(), "Dropped malformed reading events");
    }

    grouped
        .into_iter()
        .map(|(measure_id, mut readings)| {
            readings.reverse();
            if !readings.windows(2).all(|w| w[0].timestamp < w[1].timestamp) {
                tracing::warn!(measure_id = %measure_id, "Readings arrived out of order");
            }
            (measure_id, Series::from_readings(readings))
        })
        .collect()
}

fn parse_event(event: &RawReadingEvent) -> Option<(&str, Reading)> {
    let measure_id = measure_id_from_ref(event.measure_ref.as_deref()?);
    if measure_id.is_empty() {
        return None;
    }
    let value = event.value.as_f64().filter(|v| v.is_finite())?;
    let timestamp = parse_timestamp(event.date_time.as_deref()?).ok()?;
    Some((measure_id, Reading::new(timestamp, value)))
}

/// Decode a readings response body.
///
/// `source_name` names the endpoint in the error message.
pub fn parse_response_body(body: &[u8], source_name: &str) -> Result<ReadingsResponse, ParseError> {
    serde_json::from_slice(body).map_err(|e| ParseError::InvalidResponse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}
