//! Stock ledger: the only writer of quantities on hand
//!
//! Every entry and exit is validated, applied to the material's stock row and
//! journaled. The journal and stock collections are committed together.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::collections::{INVENTORY, INVENTORY_MOVEMENTS};
use shared::{
    format_quantity, same_name, CapabilityTable, InventoryValuation, MaterialCatalog,
    MaterialStock, MovementContext, MovementKind, StockMovement, StockValidator, ValidationRule,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{CatalogService, MovementJournal};
use crate::storage::{to_records, CollectionStore, CollectionWrite};

/// Result of an entry or exit, successful or not
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_stock: Option<Vec<MaterialStock>>,
    /// Rule that rejected the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<ValidationRule>,
}

impl OperationResult {
    fn applied(message: String, movement_id: Uuid, stock: Vec<MaterialStock>) -> Self {
        Self {
            success: true,
            message,
            movement_id: Some(movement_id),
            updated_stock: Some(stock),
            rule: None,
        }
    }

    fn rejected(message: String, rule: Option<ValidationRule>) -> Self {
        Self {
            success: false,
            message,
            movement_id: None,
            updated_stock: None,
            rule,
        }
    }
}

pub struct StockLedger {
    store: Arc<dyn CollectionStore>,
    catalog: CatalogService,
    journal: MovementJournal,
    write_lock: Mutex<()>,
}

impl StockLedger {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        catalog: CatalogService,
        journal: MovementJournal,
    ) -> Self {
        Self {
            store,
            catalog,
            journal,
            write_lock: Mutex::new(()),
        }
    }

    /// Ledger whose catalog and journal share `store`
    pub fn with_capabilities(
        store: Arc<dyn CollectionStore>,
        capabilities: CapabilityTable,
    ) -> Self {
        Self::new(
            store.clone(),
            CatalogService::new(store.clone(), capabilities),
            MovementJournal::new(store),
        )
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn journal(&self) -> &MovementJournal {
        &self.journal
    }

    /// Receive material into the depot from `origin`
    pub async fn apply_entry(
        &self,
        material_name: &str,
        quantity: Decimal,
        origin: &str,
        context: MovementContext,
    ) -> AppResult<OperationResult> {
        self.apply(MovementKind::Entry, material_name, quantity, origin, context)
            .await
    }

    /// Dispatch material from the depot to `destination`
    pub async fn apply_exit(
        &self,
        material_name: &str,
        quantity: Decimal,
        destination: &str,
        context: MovementContext,
    ) -> AppResult<OperationResult> {
        self.apply(MovementKind::Exit, material_name, quantity, destination, context)
            .await
    }

    async fn apply(
        &self,
        kind: MovementKind,
        material_name: &str,
        quantity: Decimal,
        counterparty: &str,
        context: MovementContext,
    ) -> AppResult<OperationResult> {
        let _guard = self.write_lock.lock().await;

        let mut stock = self.catalog.stock_snapshot().await?;
        let mut validation = {
            let catalog = MaterialCatalog::new(&stock, self.catalog.capabilities());
            StockValidator::validate(
                &catalog,
                material_name,
                quantity,
                kind,
                context.machine_type.as_deref(),
            )
        };
        if validation.ok && kind == MovementKind::Entry {
            if let Some(unit_cost) = context.unit_cost {
                validation = StockValidator::validate_unit_cost(unit_cost);
            }
        }

        if !validation.ok {
            return Ok(rejection(
                kind,
                material_name,
                quantity,
                validation.reason_or_default(),
                validation.rule,
            ));
        }

        let now = Utc::now();
        let index = match stock
            .iter()
            .position(|s| same_name(&s.material_name, material_name))
        {
            Some(index) => index,
            None if kind == MovementKind::Entry => {
                stock.push(MaterialStock::empty(material_name.trim(), now));
                stock.len() - 1
            }
            None => {
                tracing::error!(material = %material_name, "Validated exit for untracked material");
                return Err(AppError::InvariantViolation(format!(
                    "exit validated for untracked material '{}'",
                    material_name
                )));
            }
        };

        let row = &mut stock[index];
        let quantity_before = row.quantity_on_hand;
        let Some((quantity_after, clamped)) = kind.apply(quantity_before, quantity) else {
            return Ok(rejection(
                kind,
                material_name,
                quantity,
                "quantity is out of range.",
                Some(ValidationRule::QuantityOverflow),
            ));
        };
        if clamped {
            tracing::warn!(
                material = %row.material_name,
                before = %quantity_before,
                quantity = %quantity,
                "Exit exceeded stock on hand; clamped to zero"
            );
        }

        if let (MovementKind::Entry, Some(unit_cost)) = (kind, context.unit_cost) {
            match row.blended_unit_cost(quantity, unit_cost) {
                Some(average) => row.average_unit_cost = Some(average),
                None => {
                    return Ok(rejection(
                        kind,
                        material_name,
                        quantity,
                        "average unit cost is out of range.",
                        Some(ValidationRule::QuantityOverflow),
                    ));
                }
            }
        }
        row.quantity_on_hand = quantity_after;
        row.updated_at = now;

        let movement = StockMovement {
            id: Uuid::new_v4(),
            timestamp: now,
            kind,
            material_name: row.material_name.clone(),
            quantity,
            quantity_before,
            quantity_after,
            counterparty_location: counterparty.trim().to_string(),
            source_report_id: context.source_report_id,
            actor_machine_id: context.actor_machine_id,
            actor_machine_name: context.actor_machine_name,
            actor_user_name: context.actor_user_name,
            note: context.note.unwrap_or_default(),
            unit_cost: context.unit_cost,
        };

        let journal_records = self.journal.records_with(&movement).await?;
        self.store
            .commit(vec![
                CollectionWrite::new(INVENTORY_MOVEMENTS, journal_records),
                CollectionWrite::new(INVENTORY, to_records(&stock)?),
            ])
            .await?;

        tracing::info!(
            movement_id = %movement.id,
            kind = %kind,
            material = %movement.material_name,
            before = %quantity_before,
            after = %quantity_after,
            "Stock movement applied"
        );

        let message = match kind {
            MovementKind::Entry => format!(
                "Entry of {} of {} from {} recorded",
                format_quantity(quantity),
                movement.material_name,
                movement.counterparty_location
            ),
            MovementKind::Exit => format!(
                "Exit of {} of {} to {} recorded",
                format_quantity(quantity),
                movement.material_name,
                movement.counterparty_location
            ),
        };

        sort_by_material(&mut stock);
        Ok(OperationResult::applied(message, movement.id, stock))
    }

    /// Every tracked material, sorted by name
    pub async fn stock(&self) -> AppResult<Vec<MaterialStock>> {
        let mut stock = self.catalog.stock_snapshot().await?;
        sort_by_material(&mut stock);
        Ok(stock)
    }

    pub async fn stock_for(&self, material_name: &str) -> AppResult<Option<MaterialStock>> {
        Ok(self
            .catalog
            .stock_snapshot()
            .await?
            .into_iter()
            .find(|s| same_name(&s.material_name, material_name)))
    }

    pub async fn valuation(&self) -> AppResult<InventoryValuation> {
        Ok(InventoryValuation::from_stock(&self.stock().await?))
    }
}

/// Rejected operation; nothing was written
fn rejection(
    kind: MovementKind,
    material_name: &str,
    quantity: Decimal,
    reason: &str,
    rule: Option<ValidationRule>,
) -> OperationResult {
    tracing::warn!(
        kind = %kind,
        material = %material_name,
        quantity = %quantity,
        reason = %reason,
        "Stock operation rejected"
    );
    OperationResult::rejected(
        format!(
            "{} of {} of {} rejected: {}",
            kind,
            format_quantity(quantity),
            material_name.trim(),
            reason
        ),
        rule,
    )
}

fn sort_by_material(stock: &mut [MaterialStock]) {
    stock.sort_by_key(|s| s.material_name.to_lowercase());
}
