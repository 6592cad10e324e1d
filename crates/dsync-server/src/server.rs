use std::sync::Arc;

use dsync_figma::FigmaClient;
use dsync_sync::RemoteTokens;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, build_router_with_cors};
use crate::state::AppState;

/// dsync HTTP bridge.
pub struct DsyncServer {
    config: ServerConfig,
    state: AppState,
}

impl DsyncServer {
    /// A server backed by any remote collaborator.
    pub fn new(config: ServerConfig, remote: Arc<dyn RemoteTokens>) -> Self {
        let state = AppState::new(remote, config.file_id.clone());
        Self { config, state }
    }

    /// A server talking to Figma with the configured token.
    pub fn with_figma(config: ServerConfig) -> ServerResult<Self> {
        let client = FigmaClient::new(config.figma.clone())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        if self.config.permissive_cors {
            build_router_with_cors(self.state.clone())
        } else {
            build_router(self.state.clone())
        }
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            file_id = self.config.file_id.as_deref().unwrap_or("<unset>"),
            "dsync server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
