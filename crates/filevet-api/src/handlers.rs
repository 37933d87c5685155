//! HTTP handlers. Thin: extract, call the service layer, map absent results
//! to 404 and everything else through [`HttpAppError`].

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use filevet_core::models::ValidationOutcome;
use filevet_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /api/validate/{file_id} — submit a file for validation; returns the
/// PENDING record immediately.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response, HttpAppError> {
    match state.orchestrator.submit(&file_id).await? {
        Some(status) => Ok((StatusCode::ACCEPTED, Json(status)).into_response()),
        None => Err(not_found(&file_id)),
    }
}

/// GET /api/validate/{file_id} — poll the current status.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response, HttpAppError> {
    match state.orchestrator.get_status(&file_id).await? {
        Some(status) => Ok(Json(status).into_response()),
        None => Err(not_found(&file_id)),
    }
}

/// POST /api/validate/{file_id}/result — inbound callback from the external
/// validator.
pub async fn save_results(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Json(outcome): Json<ValidationOutcome>,
) -> Result<Response, HttpAppError> {
    let status = state.orchestrator.save_results(&file_id, outcome).await?;
    Ok(Json(status).into_response())
}

/// GET /api/render/{file_id} — render the stored document as PDF.
pub async fn render_pdf(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response, HttpAppError> {
    match state.render.render_pdf(&file_id).await? {
        Some(pdf) => {
            Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response())
        }
        None => Err(not_found(&file_id)),
    }
}

/// POST /api/maintenance/cleanup — run one retention sweep now.
pub async fn cleanup(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let summary = state.sweeper.run().await?;
    Ok(Json(summary).into_response())
}

fn not_found(file_id: &str) -> HttpAppError {
    HttpAppError(AppError::NotFound(format!("No file with id {}", file_id)))
}
