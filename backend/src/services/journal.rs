//! Movement journal: the append-only audit trail of the ledger

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use shared::collections::INVENTORY_MOVEMENTS;
use shared::{same_name, StockMovement};
use uuid::Uuid;

use crate::error::AppResult;
use crate::storage::{load_records, CollectionStore};

/// Append-only log of stock movements. Offers no delete, truncate or reorder.
#[derive(Clone)]
pub struct MovementJournal {
    store: Arc<dyn CollectionStore>,
}

/// What is wrong with a journaled movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainProblem {
    /// `quantity_after` does not follow from `quantity_before` and the kind
    InconsistentArithmetic,
    /// `quantity_before` differs from the previous movement's `quantity_after`
    BrokenLink,
}

/// A movement that breaks the per-material quantity chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainBreak {
    pub movement_id: Uuid,
    pub material_name: String,
    pub problem: ChainProblem,
    pub expected: Decimal,
    pub actual: Decimal,
}

impl MovementJournal {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Append one movement. Storage errors propagate.
    pub async fn append(&self, movement: &StockMovement) -> AppResult<()> {
        let records = self.records_with(movement).await?;
        self.store
            .save_collection(INVENTORY_MOVEMENTS, records)
            .await
    }

    /// Journal contents with `movement` appended, for committing alongside stock
    pub(crate) async fn records_with(&self, movement: &StockMovement) -> AppResult<Vec<Value>> {
        let mut records = self.store.load_collection(INVENTORY_MOVEMENTS).await?;
        records.push(serde_json::to_value(movement)?);
        Ok(records)
    }

    /// All movements in insertion order
    pub async fn list(&self) -> AppResult<Vec<StockMovement>> {
        load_records(self.store.as_ref(), INVENTORY_MOVEMENTS).await
    }

    /// Movements of one material in insertion order
    pub async fn list_for_material(&self, material_name: &str) -> AppResult<Vec<StockMovement>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|m| same_name(&m.material_name, material_name))
            .collect())
    }

    /// Whether a report has already produced a movement
    pub async fn contains_report(&self, report_id: &str) -> AppResult<bool> {
        Ok(self
            .list()
            .await?
            .iter()
            .any(|m| m.source_report_id.as_deref() == Some(report_id)))
    }

    /// Check every movement against its own arithmetic and its predecessor
    pub async fn verify_chain(&self) -> AppResult<Vec<ChainBreak>> {
        Ok(verify_movement_chain(&self.list().await?))
    }
}

/// Find movements whose before/after quantities do not chain per material
pub fn verify_movement_chain(movements: &[StockMovement]) -> Vec<ChainBreak> {
    let mut last_after: HashMap<String, Decimal> = HashMap::new();
    let mut breaks = Vec::new();

    for movement in movements {
        let key = movement.material_name.trim().to_lowercase();

        if let Some(previous_after) = last_after.get(&key) {
            if *previous_after != movement.quantity_before {
                breaks.push(ChainBreak {
                    movement_id: movement.id,
                    material_name: movement.material_name.clone(),
                    problem: ChainProblem::BrokenLink,
                    expected: *previous_after,
                    actual: movement.quantity_before,
                });
            }
        }

        if !movement.is_consistent() {
            // Saturates when the recorded quantities overflow
            let expected = movement
                .kind
                .apply(movement.quantity_before, movement.quantity)
                .map_or(Decimal::MAX, |(expected, _)| expected);
            breaks.push(ChainBreak {
                movement_id: movement.id,
                material_name: movement.material_name.clone(),
                problem: ChainProblem::InconsistentArithmetic,
                expected,
                actual: movement.quantity_after,
            });
        }

        last_after.insert(key, movement.quantity_after);
    }

    breaks
}
