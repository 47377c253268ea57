//! Route definitions for the Acopio stock ledger API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/inventory", inventory_routes())
        .nest("/reports", report_routes())
        .route("/reconciliation", get(handlers::run_reconciliation))
}

/// Stock, validation and journal routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route("/materials", get(handlers::list_materials))
        .route("/materials/:name", get(handlers::get_material_stock))
        .route("/valuation", get(handlers::get_valuation))
        .route("/validate", post(handlers::validate_operation))
        .route("/entries", post(handlers::record_entry))
        .route("/exits", post(handlers::record_exit))
        .route("/movements", get(handlers::list_movements))
        .route("/movements/verify", get(handlers::verify_movements))
}

/// Trip report translation routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/translate", post(handlers::translate_report))
        .route("/translate/batch", post(handlers::translate_reports))
}
