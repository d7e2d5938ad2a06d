//! Configuration module for the catalog crawler
//!
//! This module handles loading TOML configuration files, applying environment
//! overrides and validating the result before any request is made.
//!
//! # Example
//!
//! ```no_run
//! use handset_catalog::config::resolve_config;
//! use std::path::Path;
//!
//! let (config, _hash) =
//!     resolve_config(Some(Path::new("catalog.toml")), |k| std::env::var(k).ok()).unwrap();
//! println!("Crawling {} via {}", config.source.base_url, config.source.kind);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiEndpoints, Config, CrawlerConfig, FlushMode, HtmlSelectors, OutputConfig, SourceConfig,
    SourceKind, UserAgentConfig,
};

// Re-export parser functions
pub use env::apply_env_overrides;
pub use parser::{compute_config_hash, load_config, read_config, resolve_config};
pub use validation::validate;
