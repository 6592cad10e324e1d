use std::path::{Path, PathBuf};

use anyhow::Context;
use dsync_figma::FigmaConfig;
use dsync_types::Platform;
use serde::{Deserialize, Serialize};

pub const ENV_TOKEN: &str = "FIGMA_PAT";
pub const ENV_FILE_ID: &str = "FIGMA_FILE_ID";
pub const ENV_API_BASE: &str = "FIGMA_API_BASE";

/// Project settings from `dsync.toml`. Environment variables override the
/// file, and command-line flags override both.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DsyncConfig {
    pub file_id: Option<String>,
    pub figma: FigmaConfig,
    pub build: BuildConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Style Dictionary configuration file.
    pub sd_config: PathBuf,
    /// Where the nested tokens are written for Style Dictionary to read.
    pub tokens_out: PathBuf,
    pub platforms: Vec<Platform>,
    /// Program and leading arguments that run the Style Dictionary CLI.
    pub command: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            sd_config: PathBuf::from("style-dictionary.config.json"),
            tokens_out: PathBuf::from("build/tokens.json"),
            platforms: vec![Platform::Css],
            command: vec!["npx".into(), "style-dictionary".into()],
        }
    }
}

impl DsyncConfig {
    /// Read `path` if it exists, defaults otherwise.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = get(ENV_TOKEN) {
            self.figma.token = token;
        }
        if let Some(file_id) = get(ENV_FILE_ID) {
            self.file_id = Some(file_id);
        }
        if let Some(api_base) = get(ENV_API_BASE) {
            self.figma.api_base = api_base;
        }
        self
    }

    /// `dsync.toml`, then the process environment.
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::load(path)?.apply_env(|key| std::env::var(key).ok()))
    }

    /// The file id from the flag, else from config or environment.
    pub fn file_id(&self, flag: Option<&str>) -> anyhow::Result<String> {
        flag.map(str::to_string)
            .or_else(|| self.file_id.clone())
            .with_context(|| {
                format!("{ENV_FILE_ID} not provided. Set it in .env or use --file-id.")
            })
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
