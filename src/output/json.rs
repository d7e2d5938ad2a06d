//! JSON file persister

use super::traits::{OutputError, OutputResult, Persister};
use crate::model::CanonicalDevice;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the dataset as a pretty-printed JSON array
///
/// The file is written to a sibling temp file first and renamed into place,
/// so readers never see a half-written dataset.
#[derive(Debug, Clone)]
pub struct JsonFilePersister {
    path: PathBuf,
}

impl JsonFilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> OutputError {
        OutputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Persister for JsonFilePersister {
    fn persist(&self, devices: &[CanonicalDevice]) -> OutputResult<usize> {
        let mut body = serde_json::to_vec_pretty(devices)?;
        body.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp).map_err(|e| self.io_error(&temp, e))?;
        file.write_all(&body).map_err(|e| self.io_error(&temp, e))?;
        file.sync_all().map_err(|e| self.io_error(&temp, e))?;
        drop(file);

        fs::rename(&temp, &self.path).map_err(|e| self.io_error(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), records = devices.len(), "Dataset written");
        Ok(devices.len())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
