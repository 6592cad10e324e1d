use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.figma.com";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FigmaConfig {
    /// Personal access token, sent as `X-Figma-Token`.
    #[serde(skip_serializing)]
    pub token: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for FigmaConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_API_BASE.into(),
            timeout_secs: 30,
        }
    }
}

impl FigmaConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// `{api_base}/v1/files/{file_id}/{rest}`, without doubled slashes.
    pub fn file_url(&self, file_id: &str, rest: &str) -> String {
        format!(
            "{}/v1/files/{}/{}",
            self.api_base.trim_end_matches('/'),
            file_id,
            rest.trim_start_matches('/')
        )
    }
}
