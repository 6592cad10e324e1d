//! Sync orchestration for dsync.
//!
//! Sequences the core components into the user-facing operations. Each
//! operation is a single pipeline over in-memory trees that returns a
//! finished report or an error; nothing is cached between operations.
//!
//! - **pull**: fetch remote variables, convert them to a canonical tree,
//!   validate it.
//! - **push**: validate local tokens, diff them against a remote snapshot,
//!   convert the changed paths and send them, or stop at the preview when
//!   dry-running.
//! - **merge**: validate each source and fold them last-source-wins.
//! - **transform** / **build**: hand a validated tree to the build tool in
//!   its nested format.
//!
//! Only [`SyncEngine`] talks to the remote, through the [`RemoteTokens`]
//! collaborator, and it never has more than one remote call in flight.
//!
//! # Key Types
//!
//! - [`SyncEngine`] -- Remote operations (pull, push, snapshot)
//! - [`RemoteTokens`] / [`RemoteError`] / [`RemotePush`] / [`PushReceipt`] -- Remote collaborator boundary
//! - [`RemoteSnapshot`] -- Remote state captured for one operation
//! - [`InMemoryRemote`] -- Remote held in memory, counting calls
//! - [`BuildTool`] / [`BuildRequest`] -- Build collaborator boundary
//! - [`files`] -- Token file loading and writing

pub mod build;
pub mod engine;
pub mod error;
pub mod files;
pub mod local;
pub mod memory;
pub mod remote;
pub mod types;

pub use build::{BuildOutcome, BuildRequest, BuildTool};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use local::{build, merge_sources, transform_from_build, transform_to_build};
pub use memory::InMemoryRemote;
pub use remote::{PushReceipt, RemoteError, RemotePush, RemoteSnapshot, RemoteTokens};
pub use types::{MergeReport, PullOptions, PullReport, PushOptions, PushReport};
