//! Error types
//!
//! Every failure is recoverable: the engine logs, returns the error to the
//! caller and keeps processing ticks.

use thiserror::Error;

/// Errors raised by scope, action and configuration operations
#[derive(Debug, Error)]
pub enum InputError {
    /// Scope key is blank or reserved
    #[error("invalid scope key {0:?}")]
    InvalidKey(String),

    /// Scope key already registered; the old scope was replaced
    #[error("scope {0:?} already exists")]
    DuplicateKey(String),

    /// Scope key was never created or has been removed
    #[error("unknown scope {0:?}")]
    UnknownKey(String),

    /// Action id is blank
    #[error("action id must not be empty")]
    InvalidAction,

    /// Configuration failed to load or deserialize
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T, E = InputError> = std::result::Result<T, E>;
