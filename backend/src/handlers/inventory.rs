//! HTTP handlers for stock and journal endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    InventoryValuation, MaterialStock, MovementContext, StockMovement, StockOperation,
    ValidationResult,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::{ChainBreak, OperationResult};
use crate::AppState;

/// Body of an entry or exit request
#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementRequest {
    #[validate(length(min = 1, max = 200, message = "material name is required"))]
    pub material_name: String,

    pub quantity: Decimal,

    /// Origin for entries, destination for exits
    #[serde(alias = "origin", alias = "destination")]
    #[validate(length(min = 1, max = 200, message = "location is required"))]
    pub location: String,

    #[serde(default)]
    pub context: MovementContext,
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub material: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChainVerification {
    pub ok: bool,
    pub breaks: Vec<ChainBreak>,
}

/// Current stock, sorted by material
pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<Vec<MaterialStock>>> {
    Ok(Json(state.ledger.stock().await?))
}

pub async fn list_materials(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.ledger.catalog().material_names().await?))
}

/// Stock of one material, matched case-insensitively
pub async fn get_material_stock(
    State(state): State<AppState>,
    Path(material): Path<String>,
) -> AppResult<Json<MaterialStock>> {
    state
        .ledger
        .stock_for(&material)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("material '{}'", material)))
}

pub async fn get_valuation(State(state): State<AppState>) -> AppResult<Json<InventoryValuation>> {
    Ok(Json(state.ledger.valuation().await?))
}

/// Dry-run validation; never changes stock
pub async fn validate_operation(
    State(state): State<AppState>,
    Json(operation): Json<StockOperation>,
) -> AppResult<Json<ValidationResult>> {
    Ok(Json(state.ledger.catalog().validate(&operation).await?))
}

/// Record material received at the depot
pub async fn record_entry(
    State(state): State<AppState>,
    Json(input): Json<StockMovementRequest>,
) -> AppResult<Json<OperationResult>> {
    input.validate()?;
    let result = state
        .ledger
        .apply_entry(&input.material_name, input.quantity, &input.location, input.context)
        .await?;
    Ok(Json(result))
}

/// Record material dispatched from the depot
pub async fn record_exit(
    State(state): State<AppState>,
    Json(input): Json<StockMovementRequest>,
) -> AppResult<Json<OperationResult>> {
    input.validate()?;
    let result = state
        .ledger
        .apply_exit(&input.material_name, input.quantity, &input.location, input.context)
        .await?;
    Ok(Json(result))
}

pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let journal = state.ledger.journal();
    let movements = match query.material.as_deref().map(str::trim) {
        Some(material) if !material.is_empty() => journal.list_for_material(material).await?,
        _ => journal.list().await?,
    };
    Ok(Json(movements))
}

pub async fn verify_movements(State(state): State<AppState>) -> AppResult<Json<ChainVerification>> {
    let breaks = state.ledger.journal().verify_chain().await?;
    Ok(Json(ChainVerification {
        ok: breaks.is_empty(),
        breaks,
    }))
}
