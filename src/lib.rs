//! Handset Catalog: a crawl-and-normalize pipeline for phone specifications
//!
//! This crate walks an upstream source (brand list, paginated phone listings,
//! per-phone detail pages), folds loosely-structured specification sections into
//! one canonical device schema, deduplicates the result and writes a single
//! JSON dataset.

pub mod config;
pub mod crawler;
pub mod dedup;
pub mod model;
pub mod normalize;
pub mod output;
pub mod source;
pub mod throttle;

use thiserror::Error;

/// Main error type for catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Normalization error: {0}")]
    Normalize(#[from] normalize::NormalizeError),

    #[error("Source unreachable: {0}")]
    SourceUnreachable(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {var}: {message}")]
    Env { var: String, message: String },
}

/// Errors raised by source adapters
///
/// Every variant is recoverable from the crawler's point of view: the caller
/// decides whether to skip the item, abandon the brand or abort the run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON decode error for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected payload shape for {context}: {message}")]
    Shape { context: String, message: String },

    #[error("URL parse error: {0}")]
    Url(#[from] ::url::ParseError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

impl SourceError {
    /// Creates a shape error with context
    pub fn shape(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for source adapter operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlPhase};
pub use dedup::dedup_by_id;
pub use model::{BrandRef, CanonicalDevice, PhoneStub};
pub use normalize::{canonicalize, parse_sections, SectionMap};
pub use output::{CrawlStats, JsonFilePersister, Persister};
pub use source::SourceAdapter;
pub use throttle::RateLimiter;
