//! Shared model, configuration, and website-URL rules for the company profiler.

pub mod app_config;
pub mod config;
pub mod profile;
pub mod retry;
pub mod website;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use profile::{
    truncate_chars, CompanyProfile, Insights, NewsItem, ScrapedPage, MAX_NEWS_ITEMS,
};
pub use retry::{is_transient_status, retry_with_backoff, Transient};
pub use website::{
    company_name_from_title, company_name_from_url, normalize_website_url, parse_website_url,
    UrlError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
