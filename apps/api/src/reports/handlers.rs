//! Axum route handlers for the report store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::report::StoredReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveReportRequest {
    #[serde(rename = "formalReport", default)]
    pub formal_report: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// GET /api/reports
pub async fn handle_list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredReport>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// POST /api/reports
///
/// Stores a formal report. The id is read from its `Fallnummer:` line when present.
pub async fn handle_save_report(
    State(state): State<AppState>,
    payload: Result<Json<SaveReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredReport>), AppError> {
    let Json(request) = payload?;

    let formal_report = request
        .formal_report
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::Validation("formalReport is required".to_string()))?;

    let report = state.store.save(&formal_report).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// DELETE /api/reports/:id
pub async fn handle_delete_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.delete_one(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/reports
pub async fn handle_delete_all_reports(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.delete_all().await?;
    Ok(Json(SuccessResponse { success: true }))
}
