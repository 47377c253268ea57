//! HTTP request handlers

pub mod health;
pub mod inventory;
pub mod reconciliation;
pub mod reports;

pub use health::health_check;
pub use inventory::{
    get_material_stock, get_valuation, list_materials, list_movements, list_stock, record_entry,
    record_exit, validate_operation, verify_movements,
};
pub use reconciliation::run_reconciliation;
pub use reports::{translate_report, translate_reports};
