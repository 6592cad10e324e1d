use dsync_diff::TokenDiff;
use dsync_transform::TransformFailures;
use dsync_types::{TokenPath, TokenTree};
use dsync_validate::ValidationReport;
use serde::{Deserialize, Serialize};

use crate::remote::PushReceipt;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PullOptions {
    /// Fail on any transform or validation failure instead of returning the
    /// best-effort tree.
    pub strict: bool,
    /// Mode name to read; the default mode when `None`.
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PullReport {
    pub tree: TokenTree,
    pub validation: ValidationReport,
    pub transform_failures: TransformFailures,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PushOptions {
    /// Compute and return the diff without writing.
    pub dry_run: bool,
    /// Merge the remote snapshot under the local tokens before diffing, so
    /// remote-only tokens are kept. Without it they are deleted.
    pub merge_remote: bool,
    /// Abort if any changed path fails to convert.
    pub strict: bool,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            merge_remote: true,
            strict: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PushReport {
    pub diff: TokenDiff,
    /// Diff entries sent, or that would be sent on a dry run.
    pub applied: usize,
    pub dry_run: bool,
    pub transform_failures: TransformFailures,
    pub receipt: Option<PushReceipt>,
}

impl PushReport {
    pub fn is_noop(&self) -> bool {
        self.diff.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub tree: TokenTree,
    pub sources: usize,
    pub overridden: Vec<TokenPath>,
}
