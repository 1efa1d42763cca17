use cprof_core::UrlError;
use cprof_db::DbError;
use thiserror::Error;

/// Terminal pipeline failures. Everything else degrades.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("profile repository error: {0}")]
    Repository(#[from] DbError),
}
