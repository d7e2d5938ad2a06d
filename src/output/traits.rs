//! Persister trait and output errors

use crate::model::CanonicalDevice;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing the dataset
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for dataset sinks
///
/// Each call replaces whatever a previous call wrote; the dataset is always
/// written whole.
pub trait Persister: Send + Sync {
    /// Writes `devices` as the complete dataset
    ///
    /// # Arguments
    ///
    /// * `devices` - Deduplicated records in crawl order
    ///
    /// # Returns
    ///
    /// The number of records written
    fn persist(&self, devices: &[CanonicalDevice]) -> OutputResult<usize>;

    /// Where the dataset goes, for log messages
    fn describe(&self) -> String;
}
