//! Time helpers: query parameter format, timestamp parsing, day boundaries.

use chrono::{DateTime, Duration, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::reading::Timestamp;

pub const MINUTE_SECS: i64 = 60;
pub const DAY_SECS: i64 = 86_400;

/// Which midnight a day boundary is aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayAlignment {
    /// Midnight in the local time zone of the host.
    #[default]
    Local,
    /// Midnight UTC.
    Utc,
}

/// Current time as Unix seconds.
pub fn now_timestamp() -> Timestamp {
    Utc::now().timestamp()
}

/// Format a timestamp as the API's `since` parameter: `YYYY-MM-DDTHH:MM:SSZ`.
pub fn to_time_parameter(timestamp: Timestamp) -> Result<String, ParseError> {
    let dt = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| ParseError::InvalidTimestamp {
        value: timestamp.to_string(),
        reason: "out of range".to_string(),
    })?;
    Ok(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Parse an RFC 3339 timestamp into whole Unix seconds.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, ParseError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.timestamp())
        .map_err(|e| ParseError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Midnight of the day `offset_days` away from `now`.
///
/// `start_of_day(now, 0, _)` is the start of today, `-7` a week earlier.
pub fn start_of_day(now: DateTime<Utc>, offset_days: i64, alignment: DayAlignment) -> Timestamp {
    match alignment {
        DayAlignment::Utc => start_of_day_in(now, offset_days, &Utc),
        DayAlignment::Local => start_of_day_in(now, offset_days, &chrono::Local),
    }
}

/// [`start_of_day`] for an explicit time zone.
pub fn start_of_day_in<Tz: TimeZone>(now: DateTime<Utc>, offset_days: i64, tz: &Tz) -> Timestamp {
    let local = now.with_timezone(tz);
    let date = local.date_naive() + Duration::days(offset_days);
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.timestamp(),
        // Midnight skipped by a DST transition: fall back to today's offset.
        None => {
            let offset = i64::from(local.offset().fix().local_minus_utc());
            midnight.and_utc().timestamp() - offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_to_time_parameter_truncates_to_seconds() {
        assert_eq!(to_time_parameter(1_683_968_400).unwrap(), "2023-05-13T09:00:00Z");
        assert_eq!(to_time_parameter(0).unwrap(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_to_time_parameter_out_of_range() {
        assert!(to_time_parameter(i64::MAX).is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2023-05-13T09:00:00Z").unwrap(), 1_683_968_400);
        assert_eq!(parse_timestamp("2023-05-13T10:00:00+01:00").unwrap(), 1_683_968_400);
        assert_eq!(parse_timestamp("2023-05-13T09:00:00.750Z").unwrap(), 1_683_968_400);
        assert!(parse_timestamp("13/05/2023").is_err());
    }

    #[test]
    fn test_start_of_day_utc() {
        let now = at("2023-05-13T09:14:07Z");
        assert_eq!(start_of_day(now, 0, DayAlignment::Utc), 1_683_936_000);
        assert_eq!(start_of_day(now, -8, DayAlignment::Utc), 1_683_936_000 - 8 * DAY_SECS);
    }

    #[test]
    fn test_start_of_day_fixed_offset() {
        // 23:30 UTC on the 12th is already the 13th at UTC+2.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = at("2023-05-12T23:30:00Z");
        let expected = at("2023-05-12T22:00:00Z").timestamp();
        assert_eq!(start_of_day_in(now, 0, &tz), expected);
        assert_eq!(start_of_day_in(now, -1, &tz), expected - DAY_SECS);
    }

    #[test]
    fn test_day_alignment_serde() {
        let json = serde_json::to_string(&DayAlignment::Utc).unwrap();
        assert_eq!(json, "\"utc\"");
        let back: DayAlignment = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(back, DayAlignment::Local);
    }
}
