use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use dsync_figma::FigmaConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Design file every request works on.
    pub file_id: Option<String>,
    pub figma: FigmaConfig,
    /// Answer CORS preflights from any origin.
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
            file_id: None,
            figma: FigmaConfig::default(),
            permissive_cors: false,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert!(c.file_id.is_none());
        assert_eq!(c.figma.api_base, "https://api.figma.com");
        assert!(!c.permissive_cors);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            file_id = "abc123"

            [figma]
            api_base = "http://localhost:1234"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.file_id.as_deref(), Some("abc123"));
        assert_eq!(c.figma.timeout_secs, 5);
        assert!(c.figma.token.is_empty());
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        assert!(matches!(
            ServerConfig::from_toml_str("bind_addr = 12"),
            Err(ServerError::Config(_))
        ));
    }
}
