//! Style Dictionary as the platform build tool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dsync_sync::files::write_json;
use dsync_sync::{BuildOutcome, BuildRequest, BuildTool, SyncError, SyncResult};
use tokio::process::Command;
use tracing::debug;

use crate::config::BuildConfig;

/// Fields a Style Dictionary configuration cannot do without.
const REQUIRED_FIELDS: [&str; 2] = ["source", "platforms"];

/// Writes the nested tokens where the Style Dictionary configuration reads
/// them, then runs `style-dictionary build` for one platform.
#[derive(Clone, Debug)]
pub struct StyleDictionary {
    sd_config: PathBuf,
    tokens_out: PathBuf,
    command: Vec<String>,
}

impl StyleDictionary {
    pub fn new(build: &BuildConfig) -> Self {
        Self {
            sd_config: build.sd_config.clone(),
            tokens_out: build.tokens_out.clone(),
            command: build.command.clone(),
        }
    }

    pub fn with_sd_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.sd_config = path.into();
        self
    }

    pub fn sd_config(&self) -> &Path {
        &self.sd_config
    }

    /// Problems with the configuration file, empty when it looks usable.
    /// Only checks that the required fields are mentioned.
    pub fn check_config(&self) -> Vec<String> {
        let text = match std::fs::read_to_string(&self.sd_config) {
            Ok(text) => text,
            Err(e) => {
                return vec![format!(
                    "cannot read configuration {}: {e}",
                    self.sd_config.display()
                )]
            }
        };
        REQUIRED_FIELDS
            .iter()
            .filter(|field| !text.contains(*field))
            .map(|field| format!("missing required field: {field}"))
            .collect()
    }
}

#[async_trait]
impl BuildTool for StyleDictionary {
    async fn build(&self, request: &BuildRequest) -> SyncResult<BuildOutcome> {
        write_json(&self.tokens_out, &request.tokens, true)?;

        let (program, leading) = self
            .command
            .split_first()
            .ok_or_else(|| SyncError::Build("no build command configured".into()))?;
        let mut command = Command::new(program);
        command
            .args(leading)
            .arg("build")
            .arg("--config")
            .arg(&self.sd_config)
            .arg("--platform")
            .arg(request.platform.as_str());
        debug!(?command, "running style dictionary");

        let output = command
            .output()
            .await
            .map_err(|e| SyncError::Build(format!("cannot run {program}: {e}")))?;
        let log = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SyncError::Build(format!(
                "{} build for {} exited with {}: {}",
                program,
                request.platform,
                output.status,
                stderr.trim()
            )));
        }
        Ok(BuildOutcome {
            platform: Some(request.platform),
            log,
        })
    }
}
