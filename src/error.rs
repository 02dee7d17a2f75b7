//! Error types for the bulk dispatch library.

use crate::registry::Handle;
use thiserror::Error;

/// Registry-related errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown or already disconnected handle: {0:?}")]
    UnknownHandle(Handle),

    #[error("bulk size must be at least 1")]
    ZeroBulkSize,
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
