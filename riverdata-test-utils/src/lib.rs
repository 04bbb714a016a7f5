//! RiverData Test Utilities
//!
//! Shared test infrastructure for the RiverData workspace:
//! - A recording fake of the remote reading source
//! - Proptest generators for readings and raw events
//! - Fixtures shaped like real flood-monitoring responses
//! - Assertions for series and error kinds

pub use riverdata_core::{
    RawReadingEvent, Reading, ReadingSource, RiverDataError, RiverDataResult, Series, Timestamp,
};

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

// ============================================================================
// RECORDING SOURCE
// ============================================================================

/// A [`ReadingSource`] that records every request and replays scripted
/// responses in order.
///
/// When the script runs out, requests succeed with no events.
#[derive(Debug, Default)]
pub struct RecordingSource {
    calls: Mutex<Vec<(String, Option<Timestamp>)>>,
    responses: Mutex<VecDeque<RiverDataResult<Vec<RawReadingEvent>>>>,
    delay: Option<Duration>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response.
    pub fn push_events(&self, events: Vec<RawReadingEvent>) {
        self.push(Ok(events));
    }

    /// Queue a failing response.
    pub fn push_error(&self, error: impl Into<RiverDataError>) {
        self.push(Err(error.into()));
    }

    fn push(&self, response: RiverDataResult<Vec<RawReadingEvent>>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Every `(measure_id, since)` requested so far.
    pub fn calls(&self) -> Vec<(String, Option<Timestamp>)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The `since` of every request so far.
    pub fn requested_since(&self) -> Vec<Option<Timestamp>> {
        self.calls().into_iter().map(|(_, since)| since).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl ReadingSource for RecordingSource {
    async fn fetch_measure_readings(
        &self,
        measure_id: &str,
        since: Option<Timestamp>,
    ) -> RiverDataResult<Vec<RawReadingEvent>> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((measure_id.to_string(), since));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for readings, series and raw events.

    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    /// Generate a timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        1_577_836_800i64..1_893_456_000i64
    }

    /// Generate a finite reading value.
    pub fn arb_value() -> impl Strategy<Value = f64> {
        -1_000.0f64..10_000.0f64
    }

    pub fn arb_reading() -> impl Strategy<Value = Reading> {
        (arb_timestamp(), arb_value()).prop_map(|(timestamp, value)| Reading::new(timestamp, value))
    }

    /// Generate a valid series of up to `max_len` readings.
    pub fn arb_series(max_len: usize) -> impl Strategy<Value = Series> {
        prop::collection::vec(arb_reading(), 0..=max_len).prop_map(Series::from_readings)
    }

    /// Generate a series whose readings all fall in `[start, end)`.
    pub fn arb_series_between(start: Timestamp, end: Timestamp, max_len: usize) -> impl Strategy<Value = Series> {
        prop::collection::vec((start..end, arb_value()), 0..=max_len)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    /// Generate a `value` field as upstream may send it: usually a number,
    /// sometimes null, a string, or an array.
    pub fn arb_raw_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            6 => arb_value().prop_map(|v| json!(v)),
            1 => Just(Value::Null),
            1 => "[a-z]{0,6}".prop_map(Value::String),
            1 => prop::collection::vec(arb_value(), 0..3).prop_map(|v| json!(v)),
        ]
    }

    /// Generate a raw event for `measure_id`, possibly malformed.
    pub fn arb_raw_event(measure_id: &'static str) -> impl Strategy<Value = RawReadingEvent> {
        (arb_timestamp(), arb_raw_value(), any::<bool>()).prop_map(move |(ts, value, has_measure)| {
            RawReadingEvent {
                id: None,
                date_time: riverdata_core::to_time_parameter(ts).ok(),
                measure_ref: has_measure.then(|| fixtures::measure_url(measure_id)),
                value,
            }
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Events and responses shaped like the flood-monitoring API.

    use super::*;
    use serde_json::json;

    /// Flow at Kingston, 15 minute readings.
    pub const FLOW_MEASURE: &str = "3400TH-flow--i-15_min-m3_s";

    /// Stage level at Kingston.
    pub const LEVEL_MEASURE: &str = "3400TH-level-stage-i-15_min-mAOD";

    /// 2023-05-13T09:00:00Z
    pub const SAMPLE_TIME: Timestamp = 1_683_968_400;

    /// Quarter of an hour.
    pub const INTERVAL: Timestamp = 900;

    /// The measure URL used in `measure` fields.
    pub fn measure_url(measure_id: &str) -> String {
        format!("http://environment.data.gov.uk/flood-monitoring/id/measures/{measure_id}")
    }

    /// A well-formed raw event.
    pub fn raw_event(measure_id: &str, timestamp: Timestamp, value: f64) -> RawReadingEvent {
        RawReadingEvent {
            id: Some(format!("{}/readings/{timestamp}", measure_url(measure_id))),
            date_time: riverdata_core::to_time_parameter(timestamp).ok(),
            measure_ref: Some(measure_url(measure_id)),
            value: json!(value),
        }
    }

    /// Raw events for `pairs`, newest first as upstream delivers them.
    pub fn newest_first(measure_id: &str, pairs: &[(Timestamp, f64)]) -> Vec<RawReadingEvent> {
        pairs
            .iter()
            .rev()
            .map(|&(ts, value)| raw_event(measure_id, ts, value))
            .collect()
    }

    /// Evenly spaced readings: `count` readings `INTERVAL` apart from `start`.
    pub fn regular_pairs(start: Timestamp, count: usize, value: f64) -> Vec<(Timestamp, f64)> {
        (0..count as i64)
            .map(|i| (start + i * INTERVAL, value + i as f64 * 0.1))
            .collect()
    }

    pub fn series(pairs: &[(Timestamp, f64)]) -> Series {
        pairs.iter().copied().collect()
    }

    /// A readings response body with one malformed value.
    pub fn sample_response_body() -> String {
        json!({
            "@context": "http://environment.data.gov.uk/flood-monitoring/meta/context.jsonld",
            "meta": {
                "publisher": "Environment Agency",
                "version": "0.9",
                "limit": 10000
            },
            "items": [
                {
                    "@id": format!("{}/readings/2023-05-13T09-00-00Z", measure_url(FLOW_MEASURE)),
                    "dateTime": "2023-05-13T09:00:00Z",
                    "measure": measure_url(FLOW_MEASURE),
                    "value": 42.7
                },
                {
                    "@id": format!("{}/readings/2023-05-13T08-45-00Z", measure_url(FLOW_MEASURE)),
                    "dateTime": "2023-05-13T08:45:00Z",
                    "measure": measure_url(FLOW_MEASURE),
                    "value": [41.9, 42.0]
                },
                {
                    "@id": format!("{}/readings/2023-05-13T08-30-00Z", measure_url(FLOW_MEASURE)),
                    "dateTime": "2023-05-13T08:30:00Z",
                    "measure": measure_url(FLOW_MEASURE),
                    "value": 41.2
                }
            ]
        })
        .to_string()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for RiverData series and errors.

    use super::*;

    /// Assert that timestamps strictly increase.
    #[track_caller]
    pub fn assert_ordered(series: &Series) {
        for pair in series.as_slice().windows(2) {
            assert!(
                pair[0].timestamp < pair[1].timestamp,
                "Series out of order: {:?} then {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    /// Assert that every reading is at or after `since`.
    #[track_caller]
    pub fn assert_all_since(series: &Series, since: Timestamp) {
        if let Some(first) = series.first() {
            assert!(
                first.timestamp >= since,
                "Reading at {} precedes {}",
                first.timestamp,
                since
            );
        }
    }

    /// Assert that a result is a transport error.
    #[track_caller]
    pub fn assert_transport_error<T: std::fmt::Debug>(result: &RiverDataResult<T>) {
        match result {
            Err(RiverDataError::Transport(_)) => {}
            other => panic!("Expected Transport error, got: {:?}", other),
        }
    }

    /// Assert that a result is a parse error.
    #[track_caller]
    pub fn assert_parse_error<T: std::fmt::Debug>(result: &RiverDataResult<T>) {
        match result {
            Err(RiverDataError::Parse(_)) => {}
            other => panic!("Expected Parse error, got: {:?}", other),
        }
    }
}
