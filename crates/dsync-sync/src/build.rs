//! The build tool boundary.

use async_trait::async_trait;
use dsync_transform::BuildTree;
use dsync_types::Platform;

use crate::error::SyncResult;

/// One build invocation: a validated, platform-prepared nested tree and the
/// platform to generate.
#[derive(Clone, Debug)]
pub struct BuildRequest {
    pub platform: Platform,
    pub tokens: BuildTree,
}

#[derive(Clone, Debug, Default)]
pub struct BuildOutcome {
    pub platform: Option<Platform>,
    /// Whatever the tool printed. Not inspected.
    pub log: String,
}

/// Interface to the platform style generator.
#[async_trait]
pub trait BuildTool: Send + Sync {
    async fn build(&self, request: &BuildRequest) -> SyncResult<BuildOutcome>;
}
