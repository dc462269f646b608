//! Error types for wpmigrate.
//!
//! Library crates use [`MigrateError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the source API or downloading assets.
    #[error("network error: {0}")]
    Network(String),

    /// Response payload could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The destination content store rejected or failed a request.
    #[error("store error: {0}")]
    Store(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed identifiers, invalid input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a store error from any displayable message.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MigrateError::config("missing SANITY_TOKEN");
        assert_eq!(err.to_string(), "config error: missing SANITY_TOKEN");

        let err = MigrateError::store("HTTP 403 Forbidden");
        assert_eq!(err.to_string(), "store error: HTTP 403 Forbidden");

        let err = MigrateError::validation("bad asset id image-x");
        assert!(err.to_string().contains("image-x"));
    }
}
