use cprof_core::{is_transient_status, Transient, UrlError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url}")]
    RateLimited { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl Transient for ScraperError {
    fn is_transient(&self) -> bool {
        match self {
            Self::InvalidUrl(_) => false,
            Self::Http(e) => !e.is_builder() && !e.is_redirect(),
            Self::RateLimited { .. } => true,
            Self::UnexpectedStatus { status, .. } => is_transient_status(*status),
        }
    }
}
