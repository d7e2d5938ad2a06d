use crate::config::types::{
    ApiEndpoints, Config, CrawlerConfig, HtmlSelectors, OutputConfig, SourceConfig, SourceKind,
    UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates source selection, credentials and the adapter-specific section
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.token_required && config.api_token.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigError::Validation(
            "api-token is required by this source but none was configured".to_string(),
        ));
    }

    if config.brand_limit == Some(0) {
        return Err(ConfigError::Validation(
            "brand-limit must be >= 1 when set".to_string(),
        ));
    }

    match config.kind {
        SourceKind::Api => validate_api_endpoints(&config.api),
        SourceKind::Html => validate_html_selectors(&config.html),
    }
}

fn validate_api_endpoints(api: &ApiEndpoints) -> Result<(), ConfigError> {
    if !api.listing_path.contains("{brand}") {
        return Err(ConfigError::Validation(format!(
            "listing-path '{}' must contain the {{brand}} placeholder",
            api.listing_path
        )));
    }

    if !api.detail_path.contains("{phone}") {
        return Err(ConfigError::Validation(format!(
            "detail-path '{}' must contain the {{phone}} placeholder",
            api.detail_path
        )));
    }

    if api.page_param.trim().is_empty() {
        return Err(ConfigError::Validation(
            "page-param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_html_selectors(selectors: &HtmlSelectors) -> Result<(), ConfigError> {
    for (name, selector) in selectors.entries() {
        Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid selector {} = '{}': {:?}", name, selector, e))
        })?;
    }
    Ok(())
}

/// Validates crawler pacing
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.max_pages_per_brand < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages-per-brand must be >= 1, got {}",
            config.max_pages_per_brand
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
