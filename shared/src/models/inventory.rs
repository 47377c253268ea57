//! Inventory ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current on-hand quantity of one material at the depot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialStock {
    /// Unique key
    pub material_name: String,
    pub quantity_on_hand: Decimal,
    /// Weighted average purchase cost per m³, when any priced entry exists
    #[serde(default)]
    pub average_unit_cost: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl MaterialStock {
    /// A freshly tracked material with nothing on hand
    pub fn empty(material_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            material_name: material_name.into(),
            quantity_on_hand: Decimal::ZERO,
            average_unit_cost: None,
            updated_at: now,
        }
    }

    /// Weighted average cost after a priced entry, or `None` on overflow.
    ///
    /// Must be called with the quantity on hand *before* the entry is added.
    pub fn blended_unit_cost(
        &self,
        entry_quantity: Decimal,
        unit_cost: Decimal,
    ) -> Option<Decimal> {
        match self.average_unit_cost {
            Some(current) if self.quantity_on_hand > Decimal::ZERO => {
                let total_quantity = self.quantity_on_hand.checked_add(entry_quantity)?;
                let held = current.checked_mul(self.quantity_on_hand)?;
                let added = unit_cost.checked_mul(entry_quantity)?;
                held.checked_add(added)?.checked_div(total_quantity)
            }
            _ => Some(unit_cost),
        }
    }

    /// Stock value at average cost, if the cost is known. Saturates at `Decimal::MAX`.
    pub fn valuation(&self) -> Option<Decimal> {
        self.average_unit_cost.map(|cost| cost.saturating_mul(self.quantity_on_hand))
    }
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Material arriving at the depot
    Entry,
    /// Material leaving the depot
    Exit,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "entry",
            MovementKind::Exit => "exit",
        }
    }

    /// Apply a movement of `quantity` to `before`, flooring exits at zero.
    ///
    /// Returns the resulting quantity and whether the floor engaged, or `None`
    /// when the result does not fit in a `Decimal`.
    pub fn apply(&self, before: Decimal, quantity: Decimal) -> Option<(Decimal, bool)> {
        match self {
            MovementKind::Entry => Some((before.checked_add(quantity)?, false)),
            MovementKind::Exit => {
                let raw = before.checked_sub(quantity)?;
                if raw < Decimal::ZERO {
                    Some((Decimal::ZERO, true))
                } else {
                    Some((raw, false))
                }
            }
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::Entry => write!(f, "Entry"),
            MovementKind::Exit => write!(f, "Exit"),
        }
    }
}

/// One applied stock operation. Immutable once journaled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: MovementKind,
    pub material_name: String,
    pub quantity: Decimal,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    /// Origin for entries, destination for exits
    pub counterparty_location: String,
    /// Back-reference to the originating report
    #[serde(default)]
    pub source_report_id: Option<String>,
    #[serde(default)]
    pub actor_machine_id: Option<String>,
    #[serde(default)]
    pub actor_machine_name: Option<String>,
    #[serde(default)]
    pub actor_user_name: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
}

impl StockMovement {
    /// Whether `quantity_after` follows from `quantity_before`, `kind` and `quantity`
    pub fn is_consistent(&self) -> bool {
        self.quantity > Decimal::ZERO
            && matches!(
                self.kind.apply(self.quantity_before, self.quantity),
                Some((expected, _)) if expected == self.quantity_after
            )
    }

    /// Signed change in quantity on hand
    pub fn delta(&self) -> Decimal {
        self.quantity_after - self.quantity_before
    }
}

/// Who and what caused a ledger operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementContext {
    #[serde(default)]
    pub source_report_id: Option<String>,
    #[serde(default)]
    pub actor_machine_id: Option<String>,
    #[serde(default)]
    pub actor_machine_name: Option<String>,
    #[serde(default)]
    pub actor_user_name: Option<String>,
    /// Equipment type checked against the capability table
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Purchase cost per m³ for entries
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
}

/// Per-material valuation line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialValuation {
    pub material_name: String,
    pub quantity_on_hand: Decimal,
    pub average_unit_cost: Option<Decimal>,
    pub total_value: Option<Decimal>,
}

/// Inventory valuation across all tracked materials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryValuation {
    pub materials: Vec<MaterialValuation>,
    pub total_quantity: Decimal,
    /// Sum over materials with a known cost
    pub total_value: Decimal,
}

impl InventoryValuation {
    pub fn from_stock(stock: &[MaterialStock]) -> Self {
        let materials: Vec<MaterialValuation> = stock
            .iter()
            .map(|s| MaterialValuation {
                material_name: s.material_name.clone(),
                quantity_on_hand: s.quantity_on_hand,
                average_unit_cost: s.average_unit_cost,
                total_value: s.valuation(),
            })
            .collect();

        let total_quantity = materials
            .iter()
            .fold(Decimal::ZERO, |acc, m| acc.saturating_add(m.quantity_on_hand));
        let total_value = materials
            .iter()
            .filter_map(|m| m.total_value)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v));

        Self {
            materials,
            total_quantity,
            total_value,
        }
    }
}
