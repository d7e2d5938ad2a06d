//! Output module for the normalized dataset
//!
//! This module handles:
//! - Persisting the deduplicated dataset as JSON
//! - Recording and printing per-run crawl statistics

mod json;
pub mod stats;
mod traits;

pub use json::JsonFilePersister;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{OutputError, OutputResult, Persister};
