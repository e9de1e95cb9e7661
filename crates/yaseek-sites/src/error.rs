//! Error types for the site-definition subsystem.

use thiserror::Error;

/// Errors that can occur while loading or using query definitions.
#[derive(Error, Debug)]
pub enum SiteError {
    /// Failed to parse definition TOML
    #[error("failed to parse site definitions TOML in {origin}: {source}")]
    ParseError {
        /// Where the table came from
        origin: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid query definition (validation failed)
    #[error("invalid query definition {query_id}: {reason}")]
    ValidationError {
        /// Query being validated
        query_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Failed to encode an RPC request body
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for site-definition operations.
pub type Result<T> = std::result::Result<T, SiteError>;
