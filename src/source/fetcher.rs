//! HTTP fetcher shared by the source adapters
//!
//! Every outbound request goes through [`HttpFetcher`], which:
//! - waits on the shared [`RateLimiter`] before sending
//! - attaches the configured bearer token, if any
//! - maps transport failures and non-2xx statuses to [`SourceError`]

use crate::config::{Config, UserAgentConfig};
use crate::throttle::RateLimiter;
use crate::{SourceError, SourceResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with the crawler's user agent and timeouts
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Total per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use handset_catalog::config::UserAgentConfig;
/// use handset_catalog::source::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Throttled GET requests returning text or JSON
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    limiter: RateLimiter,
    token: Option<String>,
}

impl HttpFetcher {
    pub fn new(client: Client, limiter: RateLimiter, token: Option<String>) -> Self {
        Self {
            client,
            limiter,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Builds a fetcher from the crawler configuration
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying client cannot be built.
    pub fn from_config(config: &Config) -> SourceResult<Self> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.timeout_secs),
        )
        .map_err(|source| SourceError::Http {
            url: config.source.base_url.clone(),
            source,
        })?;

        Ok(Self::new(
            client,
            RateLimiter::from_millis(config.crawler.throttle_ms),
            config.source.api_token.clone(),
        ))
    }

    /// Fetches `url` and returns the response body as text
    ///
    /// # Errors
    ///
    /// - [`SourceError::Timeout`] - the request exceeded the configured timeout
    /// - [`SourceError::UnexpectedStatus`] - any non-2xx status
    /// - [`SourceError::Http`] - connection, TLS or body read failure
    pub async fn get_text(&self, url: &Url) -> SourceResult<String> {
        self.limiter.throttle().await;
        tracing::debug!(url = %url, "GET");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }

    /// Fetches `url` and decodes the body as JSON
    ///
    /// # Errors
    ///
    /// Everything [`get_text`](Self::get_text) returns, plus
    /// [`SourceError::Decode`] when the body is not valid JSON.
    pub async fn get_json(&self, url: &Url) -> SourceResult<Value> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|source| SourceError::Decode {
            context: url.to_string(),
            source,
        })
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout {
            url: url.to_string(),
        }
    } else {
        SourceError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
