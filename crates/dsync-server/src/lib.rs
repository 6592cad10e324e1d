//! HTTP bridge for dsync.
//!
//! Exposes the sync operations of one design file over REST. Every request
//! runs one complete operation against the remote; the server keeps no token
//! state of its own.
//!
//! # Routes
//!
//! - `GET /v1/health`, `GET /v1/info`
//! - `GET /v1/tokens` -- pull (`?strict=true`, `?mode=<name>`)
//! - `POST /v1/tokens/push` -- push a canonical tree (`?dry_run=true`, `?merge=false`, `?strict=true`)
//! - `POST /v1/tokens/validate` -- validate a canonical tree

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::DsyncServer;
pub use state::AppState;
