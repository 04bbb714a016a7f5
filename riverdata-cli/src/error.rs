//! Error types for the CLI.

use riverdata_client::ClientError;
use riverdata_core::RiverDataError;
use riverdata_storage::LmdbStoreError;

use crate::config::CliConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] CliConfigError),
    #[error(transparent)]
    RiverData(#[from] RiverDataError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Store(#[from] LmdbStoreError),
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("No cached readings for {0}")]
    NotCached(String),
}
