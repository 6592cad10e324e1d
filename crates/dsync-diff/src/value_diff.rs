//! Line-level diff of two token values.
//!
//! Composite values are rendered as pretty JSON and compared line by line
//! with the `similar` crate, so a preview shows which fields moved.

use dsync_types::TokenValue;
use similar::{ChangeTag, TextDiff};

/// A line-by-line comparison of two values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueDiff {
    pub lines: Vec<DiffLine>,
}

impl ValueDiff {
    /// Returns `true` if no line differs.
    pub fn is_unchanged(&self) -> bool {
        self.lines.iter().all(|l| matches!(l, DiffLine::Context(_)))
    }

    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }
}

/// A single line of a [`ValueDiff`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

fn pretty(value: &TokenValue) -> String {
    serde_json::to_string_pretty(&value.to_json()).unwrap_or_else(|_| value.to_string())
}

/// Diff two values line by line.
pub fn diff_values(old: &TokenValue, new: &TokenValue) -> ValueDiff {
    let old_text = pretty(old);
    let new_text = pretty(new);
    let text_diff = TextDiff::from_lines(&old_text, &new_text);

    let lines = text_diff
        .iter_all_changes()
        .map(|change| {
            let text = change.value().trim_end_matches('\n').to_string();
            match change.tag() {
                ChangeTag::Equal => DiffLine::Context(text),
                ChangeTag::Delete => DiffLine::Removed(text),
                ChangeTag::Insert => DiffLine::Added(text),
            }
        })
        .collect();
    ValueDiff { lines }
}
