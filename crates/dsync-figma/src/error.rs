use thiserror::Error;

/// Errors constructing a [`FigmaClient`](crate::FigmaClient). Request
/// failures are reported as [`RemoteError`](dsync_sync::RemoteError).
#[derive(Debug, Error)]
pub enum FigmaError {
    #[error("no Figma access token configured")]
    MissingToken,

    #[error("access token is not a valid header value")]
    InvalidToken,

    #[error("invalid API base URL: {0}")]
    InvalidApiBase(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

pub type FigmaResult<T> = Result<T, FigmaError>;
