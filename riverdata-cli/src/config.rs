//! Configuration loading for the riverdata CLI.
//!
//! Every field has a default; a config file only needs the values it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use riverdata_client::{ClientConfig, DEFAULT_BASE_URL};
use riverdata_core::DayAlignment;
use riverdata_storage::{CacheConfig, MAX_STORE_SIZE_MB};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiverDataConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub store_path: PathBuf,
    pub store_max_size_mb: usize,
    pub cache: CacheSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSection {
    pub retention_days: u32,
    pub throttle_interval_secs: u64,
    pub day_alignment: DayAlignment,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for RiverDataConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 30_000,
            store_path: PathBuf::from(".riverdata"),
            store_max_size_mb: 64,
            cache: CacheSection::default(),
            log: LogSection::default(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            retention_days: defaults.retention_days,
            throttle_interval_secs: defaults.throttle_interval.as_secs(),
            day_alignment: defaults.day_alignment,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "riverdata=info,warn".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl RiverDataConfig {
    /// Load from `path` if given, otherwise use the defaults. Either way the
    /// result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, CliConfigError> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, CliConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CliConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, CliConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), CliConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(CliConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(CliConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must be an http or https URL".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(CliConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(CliConfigError::InvalidValue {
                field: "store_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.store_max_size_mb == 0 || self.store_max_size_mb > MAX_STORE_SIZE_MB {
            return Err(CliConfigError::InvalidValue {
                field: "store_max_size_mb",
                reason: format!("must be between 1 and {MAX_STORE_SIZE_MB}"),
            });
        }
        if self.cache.retention_days == 0 {
            return Err(CliConfigError::InvalidValue {
                field: "cache.retention_days",
                reason: "must be > 0".to_string(),
            });
        }
        if self.log.filter.trim().is_empty() {
            return Err(CliConfigError::InvalidValue {
                field: "log.filter",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_retention_days(self.cache.retention_days)
            .with_throttle_interval(Duration::from_secs(self.cache.throttle_interval_secs))
            .with_day_alignment(self.cache.day_alignment)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RiverDataConfig::load(None).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_config(), CacheConfig::default());
        assert_eq!(config.client_config().request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = RiverDataConfig::from_toml(
            r#"
            request_timeout_ms = 5000

            [cache]
            retention_days = 30
            throttle_interval_secs = 300
            day_alignment = "utc"
            "#,
        )
        .unwrap();
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.store_max_size_mb, 64);

        let cache = config.cache_config();
        assert_eq!(cache.retention_days, 30);
        assert_eq!(cache.throttle_interval, Duration::from_secs(300));
        assert_eq!(cache.day_alignment, DayAlignment::Utc);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RiverDataConfig::from_toml("theme = \"dark\"").unwrap_err();
        assert!(matches!(err, CliConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = RiverDataConfig::default();
        config.request_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(CliConfigError::InvalidValue { field: "request_timeout_ms", .. })
        ));

        let mut config = RiverDataConfig::default();
        config.cache.retention_days = 0;
        assert!(config.validate().is_err());

        let mut config = RiverDataConfig::default();
        config.store_max_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_store() {
        let config = RiverDataConfig::from_toml(&format!("store_max_size_mb = {}", MAX_STORE_SIZE_MB + 1)).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CliConfigError::InvalidValue { field: "store_max_size_mb", .. })
        ));

        let config = RiverDataConfig::from_toml(&format!("store_max_size_mb = {MAX_STORE_SIZE_MB}")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let mut config = RiverDataConfig::default();
        config.api_base_url = "ftp://example.test".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("riverdata.toml");
        std::fs::write(&path, "[log]\njson = true\n").unwrap();

        let config = RiverDataConfig::load(Some(&path)).unwrap();
        assert!(config.log.json);
        assert_eq!(config.log.filter, "riverdata=info,warn");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            RiverDataConfig::load(Some(&missing)),
            Err(CliConfigError::Io { .. })
        ));
    }
}
