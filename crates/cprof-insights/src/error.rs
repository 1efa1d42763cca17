use cprof_core::{is_transient_status, Transient};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx from Gemini, with the message from its error envelope when present.
    #[error("Gemini API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The model returned no candidate text (blocked prompt, safety stop).
    #[error("Gemini returned no text: {reason}")]
    EmptyResponse { reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Transient for InsightError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::Api { status, .. } => is_transient_status(*status),
            Self::EmptyResponse { .. } | Self::Deserialize { .. } => false,
        }
    }
}
