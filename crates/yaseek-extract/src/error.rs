use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed JSON body: {0}")]
    MalformedJson(#[from] serde_json::Error),
}
