use axum::extract::{Query, State};
use axum::response::Json;
use dsync_sync::{PullOptions, PullReport, PushOptions, PushReport};
use dsync_types::TokenTree;
use dsync_validate::ValidationReport;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ServerResult;
use crate::state::AppState;

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "dsync-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PullQuery {
    pub strict: bool,
    pub mode: Option<String>,
}

/// `GET /v1/tokens`
pub async fn pull_handler(
    State(state): State<AppState>,
    Query(query): Query<PullQuery>,
) -> ServerResult<Json<PullReport>> {
    let options = PullOptions {
        strict: query.strict,
        mode: query.mode,
    };
    let report = state.engine()?.pull(&options).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PushQuery {
    pub dry_run: bool,
    pub merge: bool,
    pub strict: bool,
}

impl Default for PushQuery {
    fn default() -> Self {
        let defaults = PushOptions::default();
        Self {
            dry_run: defaults.dry_run,
            merge: defaults.merge_remote,
            strict: defaults.strict,
        }
    }
}

/// `POST /v1/tokens/push`
pub async fn push_handler(
    State(state): State<AppState>,
    Query(query): Query<PushQuery>,
    Json(tokens): Json<TokenTree>,
) -> ServerResult<Json<PushReport>> {
    let options = PushOptions {
        dry_run: query.dry_run,
        merge_remote: query.merge,
        strict: query.strict,
    };
    let report = state.engine()?.push(&tokens, &options).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub tokens: usize,
    pub report: ValidationReport,
}

/// `POST /v1/tokens/validate`. Always 200; `valid` carries the verdict.
pub async fn validate_handler(
    State(state): State<AppState>,
    Json(tokens): Json<TokenTree>,
) -> Json<ValidateResponse> {
    let report = state.validator().validate(&tokens);
    Json(ValidateResponse {
        valid: report.is_valid(),
        tokens: tokens.token_count(),
        report,
    })
}
