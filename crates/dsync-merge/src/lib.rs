//! Merge engine for dsync.
//!
//! Combines an ordered sequence of token trees into one. The policy is
//! last-source-wins: when a `category.name` path appears in several inputs,
//! the token from the latest input is kept. Category and token order follow
//! first-seen order across inputs, so merging the same inputs in the same
//! order always serializes to identical bytes.
//!
//! # Key Types
//!
//! - [`Merger`] -- Incremental merge accumulator that records overridden paths; [`Merger::validated`] checks every source first
//! - [`merge`] -- Merge a slice of trees that are assumed to be valid
//! - [`merge_validated`] -- Validate every source first and reject the merge on any failure
//! - [`MergeError`] -- Merge-level errors

pub mod error;
pub mod merger;

pub use error::{MergeError, MergeResult};
pub use merger::{merge, merge_validated, Merger};
