use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("invalid validation pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Failure of a single request. Caught per query by the resolver.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request to {url} failed: {reason}")]
    Failed { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
