//! Format transforms for dsync.
//!
//! Three shapes meet here:
//!
//! - the design tool's local variables ([`RemoteVariables`]): collections of
//!   primitive variables keyed by opaque ids, with a resolved type and scopes;
//! - the canonical [`TokenTree`](dsync_types::TokenTree);
//! - the build-tool nested format ([`BuildTree`]) consumed by the platform
//!   style generator.
//!
//! Failures are collected per token path in a [`Transformed`] value instead
//! of aborting the whole tree. Callers decide whether to proceed with the
//! partial output or to treat any failure as fatal via
//! [`Transformed::strict`].
//!
//! # Key Types
//!
//! - [`RemoteVariables`] / [`RemoteCollection`] / [`RemoteVariable`] -- Design-tool variable payloads
//! - [`remote_kind`] / [`RemoteShape`] -- The remote type table in both directions
//! - [`to_canonical`] / [`to_design_tool`] -- Design tool to canonical and back
//! - [`pulled_names`] -- Local token names re-keyed the way a pull names them
//! - [`to_build_format`] / [`from_build_str`] -- Canonical to build-tool nested format and back
//! - [`prepare_for_platform`] -- Platform-specific value rewriting of a build tree
//! - [`TransformError`] / [`TransformFailure`] / [`TransformFailures`] -- Per-path failures

pub mod build;
pub mod design_tool;
pub mod error;
pub mod kinds;
pub mod naming;
pub mod platform;
pub mod remote;
pub mod values;

pub use build::{from_build_str, to_build_format, BuildAttributes, BuildToken, BuildTree};
pub use design_tool::{
    pulled_names, remote_ids_for, to_canonical, to_design_tool, PullSettings, PulledNames,
};
pub use error::{TransformError, TransformFailure, TransformFailures, Transformed};
pub use kinds::{remote_kind, RemoteShape};
pub use naming::camel_case;
pub use platform::prepare_for_platform;
pub use remote::{RemoteCollection, RemoteMode, RemoteVariable, RemoteVariables, ResolvedType};
