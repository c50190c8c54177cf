//! Router creation and configuration

use super::handlers::*;
use super::types::AppState;
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use ledgerscan_sdk::Analyzer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router with the default upload limit
pub fn create_router(analyzer: Analyzer) -> Router {
    create_router_with_limit(analyzer, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Create REST API router accepting uploads up to `max_upload_bytes`
pub fn create_router_with_limit(analyzer: Analyzer, max_upload_bytes: usize) -> Router {
    let state = AppState { analyzer };

    Router::new()
        .route("/health", get(health))
        .route("/v1/uploads", post(upload))
        .route("/v1/records", get(records))
        .route("/v1/summary", get(summary))
        .route("/v1/analyze", post(analyze))
        .route("/v1/results", get(results))
        .route("/v1/persist", post(persist))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
