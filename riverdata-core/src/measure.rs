//! Measure identifiers and their display translations.
//!
//! A flood-monitoring measure id looks like
//! `3400TH-level-stage-i-15_min-mASD`: station, parameter, qualifier, value
//! type, interval and unit joined by `-`. The station part may itself contain
//! dashes, so the pattern is anchored at the end.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;

static MEASURE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*)-([^-]*)-([^-]*)-([^-]*)-([^-]*)-([^-]*)$").expect("Invalid measure id regex")
});

/// A parsed measure identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureId {
    pub station_id: String,
    pub parameter: String,
    pub qualifier: String,
    pub value_type: String,
    pub interval: String,
    pub unit: String,
}

/// Human-readable labels for a measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureLabels {
    pub station: String,
    pub parameter: String,
    pub unit: String,
}

impl MeasureId {
    /// Parse a full measure id into its parts.
    pub fn parse(id: &str) -> Result<Self, ParseError> {
        let caps = MEASURE_ID_PATTERN
            .captures(id)
            .ok_or_else(|| ParseError::MalformedMeasureId {
                id: id.to_string(),
                reason: "expected <station>-<parameter>-<qualifier>-<type>-<interval>-<unit>"
                    .to_string(),
            })?;
        let part = |i: usize| caps.get(i).map_or_else(String::new, |m| m.as_str().to_string());
        Ok(Self {
            station_id: part(1),
            parameter: part(2),
            qualifier: part(3),
            value_type: part(4),
            interval: part(5),
            unit: part(6),
        })
    }

    /// `<parameter>-<qualifier>`, e.g. `level-stage`, or just the parameter
    /// when the qualifier is empty.
    pub fn qualified_parameter(&self) -> String {
        if self.qualifier.is_empty() {
            self.parameter.clone()
        } else {
            format!("{}-{}", self.parameter, self.qualifier)
        }
    }

    /// Translate units and qualified parameters into display labels.
    ///
    /// Unknown values pass through unchanged.
    pub fn translated(&self) -> MeasureLabels {
        let qualified = self.qualified_parameter();
        let parameter = match qualified.as_str() {
            "level-stage" => "level".to_string(),
            "level-downstage" => "downstream level".to_string(),
            _ => qualified,
        };
        let unit = match self.unit.as_str() {
            "m3_s" => "m³/s",
            "mAOD" | "mASD" => "m",
            other => other,
        }
        .to_string();
        MeasureLabels {
            station: self.station_id.clone(),
            parameter,
            unit,
        }
    }
}

impl std::fmt::Display for MeasureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}-{}",
            self.station_id, self.parameter, self.qualifier, self.value_type, self.interval, self.unit
        )
    }
}

/// Check that a measure id is safe to use as a URL path segment and store key.
pub fn validate_measure_id(id: &str) -> Result<(), ParseError> {
    let reason = if id.is_empty() {
        Some("must not be empty")
    } else if id.contains(['/', '?', '#']) {
        Some("must not contain '/', '?' or '#'")
    } else if id.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ParseError::MalformedMeasureId {
            id: id.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_measure() {
        let measure = MeasureId::parse("3400TH-level-stage-i-15_min-mASD").unwrap();
        assert_eq!(measure.station_id, "3400TH");
        assert_eq!(measure.parameter, "level");
        assert_eq!(measure.qualifier, "stage");
        assert_eq!(measure.value_type, "i");
        assert_eq!(measure.interval, "15_min");
        assert_eq!(measure.unit, "mASD");
        assert_eq!(measure.to_string(), "3400TH-level-stage-i-15_min-mASD");
    }

    #[test]
    fn test_parse_empty_qualifier_and_dashed_station() {
        let measure = MeasureId::parse("E21136-A-flow--i-15_min-m3_s").unwrap();
        assert_eq!(measure.station_id, "E21136-A");
        assert_eq!(measure.parameter, "flow");
        assert_eq!(measure.qualifier, "");
        assert_eq!(measure.qualified_parameter(), "flow");
    }

    #[test]
    fn test_parse_rejects_short_id() {
        let err = MeasureId::parse("3400TH-flow").unwrap_err();
        assert!(matches!(err, ParseError::MalformedMeasureId { .. }));
    }

    #[test]
    fn test_translated_labels() {
        let level = MeasureId::parse("3400TH-level-stage-i-15_min-mASD").unwrap().translated();
        assert_eq!(level.parameter, "level");
        assert_eq!(level.unit, "m");

        let downstream = MeasureId::parse("3400TH-level-downstage-i-15_min-mAOD")
            .unwrap()
            .translated();
        assert_eq!(downstream.parameter, "downstream level");

        let flow = MeasureId::parse("3400TH-flow--i-15_min-m3_s").unwrap().translated();
        assert_eq!(flow.unit, "m³/s");
        assert_eq!(flow.parameter, "flow");
        assert_eq!(flow.station, "3400TH");
    }

    #[test]
    fn test_validate_measure_id() {
        assert!(validate_measure_id("3400TH-flow--i-15_min-m3_s").is_ok());
        assert!(validate_measure_id("").is_err());
        assert!(validate_measure_id("a/b").is_err());
        assert!(validate_measure_id("a?since=0").is_err());
        assert!(validate_measure_id("a b").is_err());
    }
}
