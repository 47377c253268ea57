//! In-process collection store

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{to_records, CollectionStore, CollectionWrite};
use crate::error::{AppError, AppResult};

/// Collections held in memory. Commits are atomic under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    failing_writes: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with typed records
    pub async fn seed<T: Serialize>(&self, name: &str, items: &[T]) -> AppResult<()> {
        let records = to_records(items)?;
        self.collections
            .write()
            .await
            .insert(name.to_string(), records);
        Ok(())
    }

    /// Make every later write to `name` fail, simulating an I/O error
    pub async fn fail_writes_to(&self, name: &str) {
        self.failing_writes.write().await.insert(name.to_string());
    }

    async fn check_writable(&self, name: &str) -> AppResult<()> {
        if self.failing_writes.read().await.contains(name) {
            return Err(AppError::Storage(format!(
                "write to collection '{}' failed",
                name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn load_collection(&self, name: &str) -> AppResult<Vec<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_collection(&self, name: &str, records: Vec<Value>) -> AppResult<()> {
        self.check_writable(name).await?;
        self.collections
            .write()
            .await
            .insert(name.to_string(), records);
        Ok(())
    }

    async fn commit(&self, writes: Vec<CollectionWrite>) -> AppResult<()> {
        for write in &writes {
            self.check_writable(&write.name).await?;
        }

        let mut collections = self.collections.write().await;
        for write in writes {
            collections.insert(write.name, write.records);
        }
        Ok(())
    }
}
