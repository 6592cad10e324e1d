//! Error rendering and exit codes.

use colored::Colorize;
use dsync_merge::MergeError;
use dsync_sync::SyncError;
use serde_json::json;

use crate::cli::OutputFormat;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID: u8 = 2;
pub const EXIT_TRANSFORM: u8 = 3;
pub const EXIT_REMOTE: u8 = 4;

/// A failure whose details were already printed by the command.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Reported {
    pub code: u8,
    pub message: String,
}

impl Reported {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(reported) = err.downcast_ref::<Reported>() {
        return reported.code;
    }
    match err.downcast_ref::<SyncError>() {
        Some(SyncError::Validation(_) | SyncError::Merge(_)) => EXIT_INVALID,
        Some(SyncError::Transform(_) | SyncError::Document(_)) => EXIT_TRANSFORM,
        Some(SyncError::Remote(_)) => EXIT_REMOTE,
        _ => EXIT_FAILURE,
    }
}

/// One `path: reason` line per failure carried by the error.
pub fn failure_lines(err: &SyncError) -> Vec<String> {
    match err {
        SyncError::Validation(e) => e.report().failures().iter().map(|f| f.to_string()).collect(),
        SyncError::Merge(MergeError::InvalidSource { report, .. }) => {
            report.failures().iter().map(|f| f.to_string()).collect()
        }
        SyncError::Transform(failures) => failures.iter().map(|f| f.to_string()).collect(),
        _ => Vec::new(),
    }
}

pub fn print_error(err: &anyhow::Error, format: OutputFormat) {
    let failures = err
        .downcast_ref::<SyncError>()
        .map(failure_lines)
        .unwrap_or_default();
    match format {
        OutputFormat::Json => {
            let body = json!({ "error": format!("{err:#}"), "failures": failures });
            println!("{body}");
        }
        OutputFormat::Text => {
            if err.downcast_ref::<Reported>().is_none() {
                eprintln!("{} {err:#}", "error:".red().bold());
            } else {
                eprintln!("{}", err.to_string().red());
            }
            for line in failures {
                eprintln!("  - {line}");
            }
        }
    }
}

/// Print skipped paths as warnings.
pub fn warn_skipped<'a>(lines: impl IntoIterator<Item = &'a dsync_transform::TransformFailure>) {
    for failure in lines {
        eprintln!("{} skipped {failure}", "warning:".yellow());
    }
}
