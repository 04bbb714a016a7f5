//! Reading types and the raw event shape delivered by the flood-monitoring API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Unix epoch timestamp in whole seconds.
pub type Timestamp = i64;

/// A single `(timestamp, value)` measurement.
///
/// Serialized as a two-element JSON array `[timestamp, value]` so that stored
/// cache entries stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Timestamp, f64)", into = "(Timestamp, f64)")]
pub struct Reading {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(Timestamp, f64)> for Reading {
    fn from((timestamp, value): (Timestamp, f64)) -> Self {
        Self { timestamp, value }
    }
}

impl From<Reading> for (Timestamp, f64) {
    fn from(reading: Reading) -> Self {
        (reading.timestamp, reading.value)
    }
}

/// A reading event as delivered by the remote source.
///
/// Every field is optional at the serde level: a single malformed event must
/// never fail the whole response. The parser decides what to drop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReadingEvent {
    /// The URL of this reading. Ignored.
    #[serde(
        rename = "@id",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// ISO-8601 time with a UTC marker.
    #[serde(
        rename = "dateTime",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_time: Option<String>,
    /// The URL of the measure; its last path segment is the measure id.
    #[serde(
        rename = "measure",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub measure_ref: Option<String>,
    /// Usually a number, but upstream occasionally sends arrays or nulls.
    #[serde(default)]
    pub value: Value,
}

/// Response envelope for readings endpoints.
///
/// Items that are not JSON objects are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingsResponse {
    #[serde(deserialize_with = "lenient_items")]
    pub items: Vec<RawReadingEvent>,
}

/// Any non-string value reads as `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<RawReadingEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Value>::deserialize(deserializer)?;
    let total = items.len();
    let events: Vec<RawReadingEvent> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if events.len() < total {
        tracing::warn!(skipped = total - events.len(), total, "Skipped reading items that are not objects");
    }
    Ok(events)
}
