use crate::config::env::apply_env_overrides;
use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads and parses a configuration file without validating it
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use handset_catalog::config::load_config;
///
/// let config = load_config(Path::new("catalog.toml")).unwrap();
/// println!("Source: {}", config.source.kind);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be matched to the same configuration.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Builds the effective configuration for a run
///
/// Reads the file when one is given (defaults otherwise), applies environment
/// overrides through `lookup`, then validates the result.
///
/// # Returns
///
/// The validated configuration and, when a file was read, its content hash.
pub fn resolve_config<F>(path: Option<&Path>, lookup: F) -> Result<(Config, Option<String>), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, hash) = match path {
        Some(path) => (read_config(path)?, Some(compute_config_hash(path)?)),
        None => (Config::default(), None),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate(&config)?;

    Ok((config, hash))
}
