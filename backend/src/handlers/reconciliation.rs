//! HTTP handler for reconciliation runs

use axum::{extract::State, Json};
use shared::ReconciliationReport;

use crate::error::AppResult;
use crate::AppState;

pub async fn run_reconciliation(
    State(state): State<AppState>,
) -> AppResult<Json<ReconciliationReport>> {
    Ok(Json(state.reconciliation.run().await?))
}
