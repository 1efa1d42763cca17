use cprof_core::{is_transient_status, Transient};
use thiserror::Error;

/// Errors returned by the `SerpAPI` client.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Network or TLS failure. The request URL is stripped so the API key
    /// never reaches logs.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// `SerpAPI` answered with an `"error"` field (bad key, quota exhausted).
    #[error("SerpAPI error: {0}")]
    Api(String),

    #[error("unexpected HTTP status {status} from SerpAPI")]
    UnexpectedStatus { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Transient for NewsError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::UnexpectedStatus { status } => is_transient_status(*status),
            Self::Api(_) | Self::Deserialize { .. } => false,
        }
    }
}
