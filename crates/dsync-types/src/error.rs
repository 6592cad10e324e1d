use thiserror::Error;

/// Errors produced by model operations.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid token value: {0}")]
    InvalidValue(String),

    #[error("invalid token path: {0}")]
    InvalidPath(String),

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("malformed token document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TypeResult<T> = Result<T, TypeError>;
