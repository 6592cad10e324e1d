use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all dsync endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/tokens", get(handler::pull_handler))
        .route("/v1/tokens/push", post(handler::push_handler))
        .route("/v1/tokens/validate", post(handler::validate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// [`build_router`] answering cross-origin requests from anywhere.
pub fn build_router_with_cors(state: AppState) -> Router {
    build_router(state).layer(CorsLayer::permissive())
}
