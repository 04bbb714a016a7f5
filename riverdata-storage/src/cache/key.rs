//! Store keys for cached readings.
//!
//! A `ReadingsKey` can only be built from a validated measure id, so the
//! cache never writes outside the `readings|` prefix.

use std::fmt;

use riverdata_core::{validate_measure_id, ParseError};

/// Prefix shared by every readings entry in the store.
pub const READINGS_PREFIX: &str = "readings|";

/// Key of the cache entry for one measure: `readings|<measureId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReadingsKey {
    key: String,
}

impl ReadingsKey {
    /// Build the key for `measure_id`, rejecting ids that are not valid
    /// path segments.
    pub fn new(measure_id: &str) -> Result<Self, ParseError> {
        validate_measure_id(measure_id)?;
        Ok(Self {
            key: format!("{READINGS_PREFIX}{measure_id}"),
        })
    }

    /// Recognize a raw store key. Returns `None` for keys outside the prefix.
    pub fn parse(raw: &str) -> Option<Self> {
        let measure_id = raw.strip_prefix(READINGS_PREFIX)?;
        Self::new(measure_id).ok()
    }

    /// The full store key.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The measure id part of the key.
    pub fn measure_id(&self) -> &str {
        &self.key[READINGS_PREFIX.len()..]
    }
}

impl fmt::Display for ReadingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for ReadingsKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
