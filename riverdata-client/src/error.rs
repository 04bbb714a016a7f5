//! Client error types.

use riverdata_core::{ConfigError, ParseError, RiverDataError, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<ClientError> for RiverDataError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Build(source) => ConfigError::InvalidValue {
                field: "http_client".to_string(),
                value: String::new(),
                reason: source.to_string(),
            }
            .into(),
            ClientError::Request { url, source } if source.is_timeout() => {
                TransportError::Timeout { url }.into()
            }
            ClientError::Request { url, source } => TransportError::RequestFailed {
                url,
                reason: source.to_string(),
            }
            .into(),
            ClientError::Status { url, status } => TransportError::Status { url, status }.into(),
            ClientError::Parse(err) => err.into(),
        }
    }
}
