//! Display formatting for readings.

use chrono::DateTime;

use crate::error::ParseError;
use crate::reading::Timestamp;

/// Two significant digits below 100, a rounded integer otherwise.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value >= 100.0 {
        return format!("{}", value.round() as i64);
    }
    if value == 0.0 {
        return "0.0".to_string();
    }
    let scale = 10f64.powi(1 - magnitude(value));
    let rounded = (value * scale).round() / scale;
    let decimals = (1 - magnitude(rounded)).max(0) as usize;
    format!("{:.*}", decimals, rounded)
}

fn magnitude(value: f64) -> i32 {
    value.abs().log10().floor() as i32
}

/// Long date, e.g. `Saturday 13 May 2023`.
pub fn format_date(timestamp: Timestamp) -> Result<String, ParseError> {
    Ok(datetime(timestamp)?.format("%A %-d %B %Y").to_string())
}

/// Hours and minutes in UTC, e.g. `09:00 UTC`.
pub fn format_time(timestamp: Timestamp) -> Result<String, ParseError> {
    Ok(datetime(timestamp)?.format("%H:%M UTC").to_string())
}

fn datetime(timestamp: Timestamp) -> Result<DateTime<chrono::Utc>, ParseError> {
    DateTime::from_timestamp(timestamp, 0).ok_or_else(|| ParseError::InvalidTimestamp {
        value: timestamp.to_string(),
        reason: "out of range".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_small() {
        assert_eq!(format_value(5.234), "5.2");
        assert_eq!(format_value(42.7), "43");
        assert_eq!(format_value(0.0123), "0.012");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(-3.14), "-3.1");
    }

    #[test]
    fn test_format_value_rounds_up_a_magnitude() {
        assert_eq!(format_value(9.96), "10");
    }

    #[test]
    fn test_format_value_large() {
        assert_eq!(format_value(123.6), "124");
        assert_eq!(format_value(100.0), "100");
    }

    #[test]
    fn test_format_date_and_time() {
        assert_eq!(format_date(1_683_968_400).unwrap(), "Saturday 13 May 2023");
        assert_eq!(format_time(1_683_968_400).unwrap(), "09:00 UTC");
        assert!(format_date(i64::MAX).is_err());
    }
}
