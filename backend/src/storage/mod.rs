//! Storage collaborator for the ledger
//!
//! The ledger only needs whole-collection read/replace over named collections.
//! Implementations decide how those collections are persisted.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgCollectionStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Replacement contents for one collection inside a [`CollectionStore::commit`]
#[derive(Debug, Clone)]
pub struct CollectionWrite {
    pub name: String,
    pub records: Vec<Value>,
}

impl CollectionWrite {
    pub fn new(name: impl Into<String>, records: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Named collections of JSON records
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Short name for health output and logs
    fn backend_name(&self) -> &'static str;

    /// All records of a collection; an unknown collection is empty
    async fn load_collection(&self, name: &str) -> AppResult<Vec<Value>>;

    /// Replace a collection's records
    async fn save_collection(&self, name: &str, records: Vec<Value>) -> AppResult<()>;

    /// Replace several collections as one unit.
    ///
    /// The default writes in the given order. When a later write fails, every
    /// earlier collection is restored to its previous contents and the failure
    /// is reported as an invariant violation naming any that could not be.
    async fn commit(&self, writes: Vec<CollectionWrite>) -> AppResult<()> {
        let mut written: Vec<(String, Vec<Value>)> = Vec::with_capacity(writes.len());

        for write in writes {
            let previous = self.load_collection(&write.name).await?;

            if let Err(err) = self.save_collection(&write.name, write.records).await {
                if written.is_empty() {
                    return Err(err);
                }

                tracing::error!(
                    collection = %write.name,
                    error = %err,
                    "Partial commit; restoring collections written before the failure"
                );

                let mut unrestored = Vec::new();
                for (name, records) in written.into_iter().rev() {
                    if let Err(restore_err) = self.save_collection(&name, records).await {
                        tracing::error!(
                            collection = %name,
                            error = %restore_err,
                            "Restore failed; collection requires manual reconciliation"
                        );
                        unrestored.push(format!("'{}' ({})", name, restore_err));
                    }
                }

                if !unrestored.is_empty() {
                    return Err(AppError::InvariantViolation(format!(
                        "write to '{}' failed ({}) and these could not be restored: {}",
                        write.name,
                        err,
                        unrestored.join(", ")
                    )));
                }

                return Err(AppError::InvariantViolation(format!(
                    "write to '{}' failed after earlier collections were written; \
                     they were restored: {}",
                    write.name, err
                )));
            }

            written.push((write.name, previous));
        }

        Ok(())
    }

    /// Connectivity check for the health endpoint
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Load and deserialize a collection
pub async fn load_records<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    name: &str,
) -> AppResult<Vec<T>> {
    store
        .load_collection(name)
        .await?
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|source| AppError::CorruptRecord {
                collection: name.to_string(),
                source,
            })
        })
        .collect()
}

/// Serialize typed records for storage
pub fn to_records<T: Serialize>(items: &[T]) -> AppResult<Vec<Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(AppError::from))
        .collect()
}
