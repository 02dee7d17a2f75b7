//! Configuration System
//!
//! Dispatcher configuration: output location, worker pool size, and logging,
//! loadable from TOML with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LoggingConfig;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Directory receiving bulk log files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of file sink worker threads (a minimum of 2 is enforced)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_workers() -> usize {
    2
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            workers: default_workers(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DispatcherConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Defaults with `BULKLINE_OUT_DIR` and `BULKLINE_WORKERS` environment
    /// overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("BULKLINE_OUT_DIR") {
            if !dir.is_empty() {
                config.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(raw) = std::env::var("BULKLINE_WORKERS") {
            if let Ok(workers) = raw.parse::<usize>() {
                config.workers = workers;
            }
        }
        config
    }
}
