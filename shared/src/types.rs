//! Common types used across the ledger

use rust_decimal::Decimal;
use thiserror::Error;

/// Unit label for material quantities
pub const VOLUME_UNIT: &str = "m³";

/// Label used for entries whose report carries no material description
pub const UNSPECIFIED_MATERIAL: &str = "unspecified material";

/// Names of the storage collections the ledger reads and writes
pub mod collections {
    pub const INVENTORY: &str = "inventory";
    pub const INVENTORY_MOVEMENTS: &str = "inventory_movements";
    pub const REPORTS: &str = "reports";
    pub const SALES: &str = "sales";
}

/// Errors raised while building domain configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("depot matcher needs a canonical name or at least one token")]
    EmptyDepotMatcher,
}

/// Format a quantity with its unit, e.g. `30 m³`
pub fn format_quantity(quantity: Decimal) -> String {
    format!("{} {}", quantity.normalize(), VOLUME_UNIT)
}

/// Normalize a free-form key for case-insensitive lookups.
///
/// Trims, lowercases and folds spaces and hyphens into underscores so that
/// `"Dump Truck"`, `"dump-truck"` and `"dump_truck"` collide.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Case-insensitive, whitespace-trimmed name comparison
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Treat `None` and whitespace-only strings alike
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
