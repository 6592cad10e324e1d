//! The remote token source/sink boundary.

use async_trait::async_trait;
use dsync_transform::{to_canonical, PullSettings, RemoteVariables, TransformFailures};
use dsync_types::TokenTree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a remote collaborator may return. All are fatal to the operation
/// that hit them; retrying is the collaborator's business.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("transport error: {0}")]
    Transport(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

/// Everything one push sends: variables to create or update, and ids of
/// variables to delete.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemotePush {
    pub upserts: RemoteVariables,
    pub deletes: Vec<String>,
}

impl RemotePush {
    pub fn is_empty(&self) -> bool {
        self.upserts.variables.is_empty() && self.deletes.is_empty()
    }

    /// Number of remote variables touched.
    pub fn variable_count(&self) -> usize {
        self.upserts.variables.len() + self.deletes.len()
    }
}

/// What the remote reports back after a write.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReceipt {
    pub applied_count: usize,
}

/// Interface to the design tool's variable store.
#[async_trait]
pub trait RemoteTokens: Send + Sync {
    async fn fetch_tokens(&self, file_id: &str) -> Result<RemoteVariables, RemoteError>;
    async fn push_tokens(&self, file_id: &str, push: &RemotePush) -> Result<PushReceipt, RemoteError>;
}

/// The remote state one operation works against: the raw variables (for id
/// reuse) and their canonical form (the diff base).
#[derive(Clone, Debug, Default)]
pub struct RemoteSnapshot {
    pub raw: RemoteVariables,
    pub tree: TokenTree,
}

impl RemoteSnapshot {
    /// Convert raw variables. Paths that fail to convert are left out of
    /// the tree and returned alongside.
    pub fn from_raw(raw: RemoteVariables, settings: &PullSettings) -> (Self, TransformFailures) {
        let transformed = to_canonical(&raw, settings);
        (
            Self {
                raw,
                tree: transformed.output,
            },
            transformed.failures,
        )
    }

    /// A snapshot of a remote that holds exactly `tree`, for previews against
    /// a known state.
    pub fn from_tree(tree: TokenTree) -> Self {
        let raw = dsync_transform::to_design_tool(&tree, None).output;
        Self { raw, tree }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_includes_retry_hint() {
        let err = RemoteError::RateLimited {
            retry_after: Some(30),
        };
        assert_eq!(err.to_string(), "rate limited (retry after 30s)");
        let err = RemoteError::RateLimited { retry_after: None };
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn empty_push() {
        assert!(RemotePush::default().is_empty());
    }
}
