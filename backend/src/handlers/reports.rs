//! HTTP handlers for trip report translation

use axum::{extract::State, Json};
use shared::Report;

use crate::error::{AppError, AppResult};
use crate::services::{ReportTranslation, TranslationOutcome};
use crate::AppState;

pub async fn translate_report(
    State(state): State<AppState>,
    Json(report): Json<Report>,
) -> AppResult<Json<TranslationOutcome>> {
    Ok(Json(state.translator.translate(&report).await?))
}

/// Translate reports in the order given
pub async fn translate_reports(
    State(state): State<AppState>,
    Json(reports): Json<Vec<Report>>,
) -> AppResult<Json<Vec<ReportTranslation>>> {
    if reports.is_empty() {
        return Err(AppError::ValidationError(
            "at least one report is required".to_string(),
        ));
    }
    Ok(Json(state.translator.translate_all(&reports).await?))
}
