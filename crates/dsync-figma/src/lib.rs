//! Figma REST collaborator for dsync.
//!
//! [`FigmaClient`] implements [`RemoteTokens`](dsync_sync::RemoteTokens)
//! against the local-variables endpoints of the Figma REST API. It makes
//! exactly one HTTP request per call and never retries; rate limits and auth
//! failures surface as [`RemoteError`](dsync_sync::RemoteError) variants.
//!
//! # Key Types
//!
//! - [`FigmaClient`] -- The HTTP collaborator
//! - [`FigmaConfig`] -- Token, API base, and timeout
//! - [`VariablesUpdate`] -- Body of a bulk variables write

pub mod client;
pub mod config;
pub mod error;
pub mod payload;

pub use client::FigmaClient;
pub use config::FigmaConfig;
pub use error::{FigmaError, FigmaResult};
pub use payload::{Action, VariablesUpdate};
