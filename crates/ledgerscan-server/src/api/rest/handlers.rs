//! API endpoint handlers

use super::extractors::{CsvBody, QueryExtractor};
use super::types::*;
use crate::error::ServerError;
use axum::{extract::State, http::StatusCode, Json};
use ledgerscan_sdk::SessionSnapshot;
use tracing::info;

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Replace the dataset with the uploaded CSV
pub(super) async fn upload(
    State(state): State<AppState>,
    CsvBody(body): CsvBody,
) -> Result<(StatusCode, Json<SessionSnapshot>), ServerError> {
    info!(bytes = body.len(), "Received CSV upload");
    let snapshot = state.analyzer.load_csv(&body).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Processed records of the current dataset
pub(super) async fn records(
    State(state): State<AppState>,
    QueryExtractor(query): QueryExtractor<RecordsQuery>,
) -> Json<RecordsResponse> {
    let records = state.analyzer.records(query.candidates_only).await;
    Json(RecordsResponse {
        count: records.len(),
        records,
    })
}

/// Session snapshot with dataset summary
pub(super) async fn summary(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.analyzer.snapshot().await)
}

/// Run the scoring stage
pub(super) async fn analyze(
    State(state): State<AppState>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let outcome = state.analyzer.analyze().await?;
    let current = state.analyzer.results().await;
    let session = state.analyzer.snapshot().await;

    let response = AnalyzeResponse::new(outcome, current, session);
    info!(outcome = response.outcome, flagged = response.count, "Analyze request served");
    Ok(Json(response))
}

/// Merged final records, highest fraud score first
pub(super) async fn results(State(state): State<AppState>) -> Json<ResultsResponse> {
    let results = state.analyzer.results().await;
    Json(ResultsResponse {
        count: results.len(),
        results,
    })
}

/// Persist the current final records
pub(super) async fn persist(
    State(state): State<AppState>,
) -> Result<Json<PersistResponse>, ServerError> {
    let outcome = state.analyzer.persist().await?;
    let response = PersistResponse::from(outcome);
    info!(outcome = response.outcome, saved = response.saved, "Persist request served");
    Ok(Json(response))
}
