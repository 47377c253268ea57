//! WebAssembly module for the Acopio stock ledger
//!
//! Provides client-side computation for:
//! - Stock operation validation before submitting
//! - Trip report classification against the depot
//! - Reconciliation over locally held records
//!
//! Every function exchanges JSON strings with JavaScript.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{
    classify_trip, CapabilityTable, MaterialCatalog, ReconciliationEngine, ReconciliationSnapshot,
};

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Could not encode result: {}", e))
}

fn validate_json(stock_json: &str, operation_json: &str) -> Result<String, String> {
    let stock: Vec<MaterialStock> = parse(stock_json, "stock")?;
    let operation: StockOperation = parse(operation_json, "operation")?;
    let capabilities = CapabilityTable::standard();
    let catalog = MaterialCatalog::new(&stock, &capabilities);
    render(&StockValidator::validate_operation(&catalog, &operation))
}

fn classify_json(report_json: &str) -> Result<String, String> {
    let report: Report = parse(report_json, "report")?;
    render(&classify_trip(
        &report,
        &DepotMatcher::default(),
        UNSPECIFIED_MATERIAL,
    ))
}

fn reconcile_json(snapshot_json: &str, detected_at: &str) -> Result<String, String> {
    let snapshot: ReconciliationSnapshot = parse(snapshot_json, "snapshot")?;
    let detected_at = DateTime::parse_from_rfc3339(detected_at)
        .map_err(|e| format!("Invalid timestamp: {}", e))?
        .with_timezone(&Utc);
    render(&ReconciliationEngine::default().run(&snapshot, detected_at))
}

fn valuation_json(stock_json: &str) -> Result<String, String> {
    let stock: Vec<MaterialStock> = parse(stock_json, "stock")?;
    render(&InventoryValuation::from_stock(&stock))
}

// Failures also go to the browser console
fn to_js(error: String) -> JsValue {
    let value = JsValue::from_str(&error);
    web_sys::console::warn_1(&value);
    value
}

/// Validate an entry or exit against a stock snapshot
#[wasm_bindgen]
pub fn validate_stock_operation(stock_json: &str, operation_json: &str) -> Result<String, JsValue> {
    validate_json(stock_json, operation_json).map_err(to_js)
}

/// Classify a trip report as entry, exit, rejected exit or not applicable
#[wasm_bindgen]
pub fn classify_trip_report(report_json: &str) -> Result<String, JsValue> {
    classify_json(report_json).map_err(to_js)
}

/// Whether a free-text location names the depot
#[wasm_bindgen]
pub fn location_is_depot(location: &str) -> bool {
    DepotMatcher::default().matches(location)
}

/// Run every reconciliation check; `detected_at` is RFC 3339
#[wasm_bindgen]
pub fn run_reconciliation(snapshot_json: &str, detected_at: &str) -> Result<String, JsValue> {
    reconcile_json(snapshot_json, detected_at).map_err(to_js)
}

#[wasm_bindgen]
pub fn inventory_valuation(stock_json: &str) -> Result<String, JsValue> {
    valuation_json(stock_json).map_err(to_js)
}
