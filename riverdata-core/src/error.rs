//! Error types for RiverData operations

use thiserror::Error;

/// Parse errors: malformed identifiers, timestamps, or API responses.
///
/// These are raised immediately and never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed measure id '{id}': {reason}")]
    MalformedMeasureId { id: String, reason: String },

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid response from {source_name}: {reason}")]
    InvalidResponse { source_name: String, reason: String },
}

/// Transport errors from the remote reading source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out")]
    Timeout { url: String },
}

/// Errors computed over a series.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Readings must not be empty")]
    Empty,
}

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store backend error: {reason}")]
    Backend { reason: String },

    #[error("Failed to serialize value for key '{key}': {reason}")]
    Serialization { key: String, reason: String },

    #[error("Failed to deserialize value for key '{key}': {reason}")]
    Deserialization { key: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all RiverData errors.
#[derive(Debug, Clone, Error)]
pub enum RiverDataError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RiverDataError {
    /// True for failures of the remote source (network, status, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias for RiverData operations.
pub type RiverDataResult<T> = Result<T, RiverDataError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_malformed_measure_id() {
        let err = ParseError::MalformedMeasureId {
            id: "bad/id".to_string(),
            reason: "contains '/'".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Malformed measure id"));
        assert!(msg.contains("bad/id"));
    }

    #[test]
    fn test_transport_error_display_status() {
        let err = TransportError::Status {
            url: "https://example.test/readings".to_string(),
            status: 503,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("503"));
        assert!(msg.contains("https://example.test/readings"));
    }

    #[test]
    fn test_series_error_display_empty() {
        assert_eq!(SeriesError::Empty.to_string(), "Readings must not be empty");
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "retention_days".to_string(),
            value: "0".to_string(),
            reason: "must be > 0".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("retention_days"));
        assert!(msg.contains("must be > 0"));
    }

    #[test]
    fn test_river_data_error_from_variants() {
        let parse = RiverDataError::from(ParseError::InvalidTimestamp {
            value: "yesterday".to_string(),
            reason: "not RFC 3339".to_string(),
        });
        assert!(matches!(parse, RiverDataError::Parse(_)));
        assert!(!parse.is_transport());

        let transport = RiverDataError::from(TransportError::Timeout {
            url: "https://example.test".to_string(),
        });
        assert!(transport.is_transport());

        let series = RiverDataError::from(SeriesError::Empty);
        assert!(matches!(series, RiverDataError::Series(_)));

        let store = RiverDataError::from(StoreError::LockPoisoned);
        assert!(matches!(store, RiverDataError::Store(_)));
    }
}
