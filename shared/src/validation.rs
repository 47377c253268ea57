//! Stock operation validation
//!
//! Pure checks run before any ledger mutation. Calling [`StockValidator::validate`]
//! has no side effects, so identical inputs always give identical results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::MaterialCatalog;
use crate::models::MovementKind;
use crate::types::{format_quantity, non_blank};

/// An entry or exit to be checked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockOperation {
    pub material_name: String,
    pub quantity: Decimal,
    pub kind: MovementKind,
    #[serde(default)]
    pub machine_type: Option<String>,
}

/// Rule that rejected an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    NonPositiveQuantity,
    MissingMaterialName,
    UnknownMaterial,
    InsufficientStock,
    QuantityOverflow,
    EntryNotPermitted,
    ExitNotPermitted,
    NonPositiveUnitCost,
}

/// Outcome of validating one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<ValidationRule>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            ok: true,
            reason: None,
            available_quantity: None,
            rule: None,
        }
    }

    fn invalid(rule: ValidationRule, reason: String) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            available_quantity: None,
            rule: Some(rule),
        }
    }

    fn with_available(mut self, available: Decimal) -> Self {
        self.available_quantity = Some(available);
        self
    }

    /// Reason text, empty for valid results
    pub fn reason_or_default(&self) -> &str {
        self.reason.as_deref().unwrap_or("")
    }
}

/// Validates entries and exits against current stock and machine capabilities
#[derive(Debug, Clone, Copy, Default)]
pub struct StockValidator;

impl StockValidator {
    /// Check an operation. Rules apply in order: positive quantity, material
    /// name present, stock availability for exits, representable result for
    /// entries, machine capability.
    pub fn validate(
        catalog: &MaterialCatalog<'_>,
        material_name: &str,
        quantity: Decimal,
        kind: MovementKind,
        machine_type: Option<&str>,
    ) -> ValidationResult {
        if quantity <= Decimal::ZERO {
            return ValidationResult::invalid(
                ValidationRule::NonPositiveQuantity,
                "quantity must be positive.".to_string(),
            );
        }

        if non_blank(Some(material_name)).is_none() {
            return ValidationResult::invalid(
                ValidationRule::MissingMaterialName,
                "material name is required.".to_string(),
            );
        }

        if kind == MovementKind::Exit {
            match catalog.quantity_on_hand(material_name) {
                None => {
                    return ValidationResult::invalid(
                        ValidationRule::UnknownMaterial,
                        format!(
                            "material '{}' is not in stock, available: {}",
                            material_name.trim(),
                            format_quantity(Decimal::ZERO)
                        ),
                    )
                    .with_available(Decimal::ZERO);
                }
                Some(available) if available < quantity => {
                    return ValidationResult::invalid(
                        ValidationRule::InsufficientStock,
                        format!("insufficient stock, available: {}", format_quantity(available)),
                    )
                    .with_available(available);
                }
                Some(_) => {}
            }
        }

        if kind == MovementKind::Entry {
            let on_hand = catalog.quantity_on_hand(material_name).unwrap_or(Decimal::ZERO);
            if on_hand.checked_add(quantity).is_none() {
                return ValidationResult::invalid(
                    ValidationRule::QuantityOverflow,
                    format!(
                        "entry would exceed the largest representable stock, available: {}",
                        format_quantity(on_hand)
                    ),
                )
                .with_available(on_hand);
            }
        }

        if let Some(machine_type) = non_blank(machine_type) {
            if catalog.is_known_machine_type(machine_type) {
                let capability = catalog.capability(Some(machine_type));
                match kind {
                    MovementKind::Entry if !capability.can_enter => {
                        return ValidationResult::invalid(
                            ValidationRule::EntryNotPermitted,
                            format!("machine type '{}' may not add stock", machine_type),
                        );
                    }
                    MovementKind::Exit if !capability.can_exit => {
                        return ValidationResult::invalid(
                            ValidationRule::ExitNotPermitted,
                            format!("machine type '{}' may not draw down stock", machine_type),
                        );
                    }
                    _ => {}
                }
            }
        }

        ValidationResult::valid()
    }

    /// Check the purchase cost attached to an entry
    pub fn validate_unit_cost(unit_cost: Decimal) -> ValidationResult {
        if unit_cost <= Decimal::ZERO {
            return ValidationResult::invalid(
                ValidationRule::NonPositiveUnitCost,
                "unit cost must be positive.".to_string(),
            );
        }
        ValidationResult::valid()
    }

    /// Validate a [`StockOperation`] value
    pub fn validate_operation(
        catalog: &MaterialCatalog<'_>,
        operation: &StockOperation,
    ) -> ValidationResult {
        Self::validate(
            catalog,
            &operation.material_name,
            operation.quantity,
            operation.kind,
            operation.machine_type.as_deref(),
        )
    }
}
