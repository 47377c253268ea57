//! Material catalog service: read-only access to tracked materials

use std::sync::Arc;

use shared::collections::INVENTORY;
use shared::{
    CapabilityTable, MaterialCatalog, MaterialStock, StockOperation, StockValidator,
    ValidationResult,
};

use crate::error::AppResult;
use crate::storage::{load_records, CollectionStore};

/// Loads stock snapshots and holds the capability table
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CollectionStore>,
    capabilities: Arc<CapabilityTable>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CollectionStore>, capabilities: CapabilityTable) -> Self {
        Self {
            store,
            capabilities: Arc::new(capabilities),
        }
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Current stock rows in storage order
    pub async fn stock_snapshot(&self) -> AppResult<Vec<MaterialStock>> {
        load_records(self.store.as_ref(), INVENTORY).await
    }

    /// Distinct tracked material names, sorted
    pub async fn material_names(&self) -> AppResult<Vec<String>> {
        let stock = self.stock_snapshot().await?;
        Ok(MaterialCatalog::new(&stock, &self.capabilities).material_names())
    }

    /// Validate an operation against the current snapshot without applying it
    pub async fn validate(&self, operation: &StockOperation) -> AppResult<ValidationResult> {
        let stock = self.stock_snapshot().await?;
        let catalog = MaterialCatalog::new(&stock, &self.capabilities);
        Ok(StockValidator::validate_operation(&catalog, operation))
    }
}
