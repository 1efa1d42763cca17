use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let gemini_api_key = require("GEMINI_API_KEY")?;
    let serpapi_key = require("SERPAPI_KEY")?;

    let env = parse_environment(&or_default("CPROF_ENV", "development"))?;
    let log_level = or_default("CPROF_LOG_LEVEL", "info");
    let gemini_model = or_default("GEMINI_MODEL", "gemini-1.5-flash");

    let db_max_connections = parse_num(&lookup, "CPROF_DB_MAX_CONNECTIONS", 5)?;
    let db_min_connections = parse_num(&lookup, "CPROF_DB_MIN_CONNECTIONS", 1)?;
    let db_acquire_timeout_secs = parse_num(&lookup, "CPROF_DB_ACQUIRE_TIMEOUT_SECS", 10)?;

    let scraper_timeout_secs = parse_num(&lookup, "CPROF_SCRAPER_TIMEOUT_SECS", 10)?;
    let scraper_user_agent = or_default("CPROF_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let content_char_limit = parse_num(&lookup, "CPROF_CONTENT_CHAR_LIMIT", 5000)?;
    let max_outbound_links = parse_num(&lookup, "CPROF_MAX_OUTBOUND_LINKS", 20)?;

    let news_timeout_secs = parse_num(&lookup, "CPROF_NEWS_TIMEOUT_SECS", 15)?;
    let llm_timeout_secs = parse_num(&lookup, "CPROF_LLM_TIMEOUT_SECS", 60)?;

    let max_retries = parse_num(&lookup, "CPROF_MAX_RETRIES", 1)?;
    if max_retries > 1 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CPROF_MAX_RETRIES".to_string(),
            reason: format!("at most 1 retry is allowed, got {max_retries}"),
        });
    }
    let retry_backoff_ms = parse_num(&lookup, "CPROF_RETRY_BACKOFF_MS", 500)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        gemini_api_key,
        gemini_model,
        serpapi_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_timeout_secs,
        scraper_user_agent,
        content_char_limit,
        max_outbound_links,
        news_timeout_secs,
        llm_timeout_secs,
        max_retries,
        retry_backoff_ms,
    })
}

/// Parse a numeric env var, falling back to `default` when unset.
fn parse_num<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CPROF_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
