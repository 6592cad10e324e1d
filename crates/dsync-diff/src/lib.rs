//! Diff engine for dsync.
//!
//! Compares a base tree (usually the remote snapshot) with a proposed tree
//! and produces one entry per path that differs in value or type. Equal
//! paths are omitted, so an empty diff means a push would change nothing.
//!
//! # Key Types
//!
//! - [`TokenDiff`] / [`DiffEntry`] / [`Change`] -- Per-path change set (added/removed/changed)
//! - [`ValueDiff`] / [`DiffLine`] -- Line-level diff of two composite values
//! - [`render_text`] -- Plain-text dry-run preview

pub mod render;
pub mod token_diff;
pub mod value_diff;

pub use render::render_text;
pub use token_diff::{diff, Change, DiffEntry, TokenDiff};
pub use value_diff::{diff_values, DiffLine, ValueDiff};
