use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dsync_figma::FigmaError;
use dsync_sync::SyncError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("figma client error: {0}")]
    Figma(#[from] FigmaError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotConfigured(_) => StatusCode::BAD_REQUEST,
            ServerError::Sync(e) => match e {
                SyncError::Validation(_)
                | SyncError::Transform(_)
                | SyncError::Merge(_)
                | SyncError::Document(_)
                | SyncError::Parse { .. } => StatusCode::BAD_REQUEST,
                SyncError::Remote(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Per-path failures, when the error carries them.
    fn failures(&self) -> Option<Value> {
        let ServerError::Sync(e) = self else {
            return None;
        };
        let failures = match e {
            SyncError::Validation(v) => serde_json::to_value(v.report().failures()),
            SyncError::Transform(t) => serde_json::to_value(t),
            SyncError::Merge(dsync_merge::MergeError::InvalidSource { report, .. }) => {
                serde_json::to_value(report.failures())
            }
            _ => return None,
        };
        failures.ok()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let mut body = json!({ "error": self.to_string() });
        if let Some(failures) = self.failures() {
            body["failures"] = failures;
        }
        (status, Json(body)).into_response()
    }
}
