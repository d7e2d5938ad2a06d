//! Environment variable overrides
//!
//! Variables are read through a lookup function so callers (and tests) decide
//! where they come from.

use crate::config::types::Config;
use crate::ConfigError;
use std::str::FromStr;

pub const ENV_SOURCE: &str = "CATALOG_SOURCE";
pub const ENV_BASE_URL: &str = "CATALOG_BASE_URL";
/// Accepted as a fallback for `CATALOG_BASE_URL`
pub const ENV_API_URL: &str = "API_URL";
pub const ENV_API_TOKEN: &str = "CATALOG_API_TOKEN";
/// Accepted as a fallback for `CATALOG_API_TOKEN`
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_BRAND_LIMIT: &str = "CATALOG_BRAND_LIMIT";
pub const ENV_THROTTLE_MS: &str = "CATALOG_THROTTLE_MS";
pub const ENV_TIMEOUT_SECS: &str = "CATALOG_TIMEOUT_SECS";
pub const ENV_OUTPUT: &str = "CATALOG_OUTPUT";
pub const ENV_FLUSH: &str = "CATALOG_FLUSH";

/// Applies recognized environment variables on top of `config`
///
/// Blank values are ignored. A value that does not parse is a configuration
/// error naming the variable.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(kind) = get(ENV_SOURCE) {
        config.source.kind = parse_var(ENV_SOURCE, &kind)?;
    }
    if let Some(base_url) = get(ENV_BASE_URL).or_else(|| get(ENV_API_URL)) {
        config.source.base_url = base_url;
    }
    if let Some(token) = get(ENV_API_TOKEN).or_else(|| get(ENV_API_KEY)) {
        config.source.api_token = Some(token);
    }
    if let Some(limit) = get(ENV_BRAND_LIMIT) {
        config.source.brand_limit = Some(parse_var(ENV_BRAND_LIMIT, &limit)?);
    }
    if let Some(ms) = get(ENV_THROTTLE_MS) {
        config.crawler.throttle_ms = parse_var(ENV_THROTTLE_MS, &ms)?;
    }
    if let Some(secs) = get(ENV_TIMEOUT_SECS) {
        config.crawler.timeout_secs = parse_var(ENV_TIMEOUT_SECS, &secs)?;
    }
    if let Some(path) = get(ENV_OUTPUT) {
        config.output.path = path;
    }
    if let Some(flush) = get(ENV_FLUSH) {
        config.output.flush = parse_var(ENV_FLUSH, &flush)?;
    }

    Ok(())
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Env {
        var: var.to_string(),
        message: format!("'{}': {}", value, e),
    })
}
