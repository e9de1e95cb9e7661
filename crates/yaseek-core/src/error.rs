//! Core error types for yaseek.
//!
//! Configuration and credential loading each get their own error enum; the
//! binary wraps them with context at the boundary.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Errors raised while loading a cookie-jar file.
#[derive(Error, Debug)]
pub enum CookieError {
    /// The cookie file does not exist
    #[error("cookie file not found at {path}")]
    NotFound {
        /// Path where the cookie file was expected
        path: String,
    },

    /// The cookie file exists but could not be read
    #[error("failed to read cookie file {path}: {source}")]
    Read {
        /// Path to the cookie file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
