//! Errors surfaced by bridge config loading.

use thiserror::Error;

/// Failure while reading, decoding, or validating a bridge config layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read bridge config: {0}")]
    Io(#[from] std::io::Error),
    /// JSON5 syntax error.
    #[error("failed to parse bridge config: {0}")]
    Parse(#[from] json5::Error),
    /// Shape mismatch that slipped past schema validation.
    #[error("failed to decode bridge config: {0}")]
    Decode(#[from] serde_json::Error),
    /// Schema or invariant violation at a dotted path.
    #[error("invalid bridge config at {path}: {message}")]
    InvalidField { path: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            path: path.into(),
            message: message.into(),
        }
    }
}
