use std::path::PathBuf;

use dsync_merge::MergeError;
use dsync_transform::{TransformError, TransformFailures};
use dsync_types::TypeError;
use dsync_validate::ValidationError;
use thiserror::Error;

use crate::remote::RemoteError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transform(#[from] TransformFailures),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("build tool failed: {0}")]
    Build(String),

    #[error(transparent)]
    Document(#[from] TransformError),

    #[error("cannot read tokens from {}: {source}", .path.display())]
    Parse { path: PathBuf, source: TypeError },

    #[error("serialization error: {0}")]
    Serialization(#[from] TypeError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no token files found in {}", .0.display())]
    NoSources(PathBuf),
}

pub type SyncResult<T> = Result<T, SyncError>;
