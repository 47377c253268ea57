//! Reconciliation over stored reports, sales and stock

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::collections::{INVENTORY, REPORTS, SALES};
use shared::{DepotMatcher, ReconciliationEngine, ReconciliationReport, ReconciliationSnapshot};

use crate::error::AppResult;
use crate::storage::{load_records, CollectionStore};

/// Read-only; keeps no state between runs
#[derive(Clone)]
pub struct ReconciliationService {
    store: Arc<dyn CollectionStore>,
    engine: ReconciliationEngine,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn CollectionStore>, depot: DepotMatcher) -> Self {
        Self {
            store,
            engine: ReconciliationEngine::new(depot),
        }
    }

    /// Point-in-time copy of the three collections
    pub async fn snapshot(&self) -> AppResult<ReconciliationSnapshot> {
        let store = self.store.as_ref();
        Ok(ReconciliationSnapshot {
            reports: load_records(store, REPORTS).await?,
            sales: load_records(store, SALES).await?,
            stock: load_records(store, INVENTORY).await?,
        })
    }

    pub async fn run(&self) -> AppResult<ReconciliationReport> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, detected_at: DateTime<Utc>) -> AppResult<ReconciliationReport> {
        let snapshot = self.snapshot().await?;
        let report = self.engine.run(&snapshot, detected_at);

        if report.is_clean() {
            tracing::info!("Reconciliation found no discrepancies");
        } else {
            tracing::warn!(
                total = report.total_discrepancies,
                inventory = report.by_category.inventory.len(),
                sales = report.by_category.sales.len(),
                report = report.by_category.report.len(),
                "Reconciliation found discrepancies"
            );
        }

        Ok(report)
    }
}
