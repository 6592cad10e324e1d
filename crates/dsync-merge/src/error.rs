//! Error types for the merge crate.

use dsync_validate::ValidationReport;

/// Errors that can occur while merging token trees.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// One of the source trees failed validation. The merge is abandoned
    /// rather than dropping the source.
    #[error("merge source #{index} is invalid ({} problem(s))", .report.len())]
    InvalidSource {
        index: usize,
        report: ValidationReport,
    },
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
