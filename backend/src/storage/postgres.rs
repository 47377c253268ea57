//! PostgreSQL-backed collection store
//!
//! Each collection is one row of `stock_collections` holding its records as a
//! JSONB array, which keeps the whole-collection replace contract.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use super::{CollectionStore, CollectionWrite};
use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

const UPSERT_COLLECTION: &str = r#"
    INSERT INTO stock_collections (name, records, updated_at)
    VALUES ($1, $2, NOW())
    ON CONFLICT (name)
    DO UPDATE SET records = EXCLUDED.records, updated_at = NOW()
"#;

#[derive(Clone)]
pub struct PgCollectionStore {
    db: PgPool,
}

impl PgCollectionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a connection pool from configuration
    pub async fn connect(config: &StorageConfig) -> AppResult<Self> {
        let url = config.database_url.as_deref().ok_or_else(|| {
            AppError::Configuration("storage.database_url is required for postgres".to_string())
        })?;

        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await?;

        Ok(Self::new(db))
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl CollectionStore for PgCollectionStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn load_collection(&self, name: &str) -> AppResult<Vec<Value>> {
        let records = sqlx::query_scalar::<_, Json<Vec<Value>>>(
            "SELECT records FROM stock_collections WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(records.map(|Json(records)| records).unwrap_or_default())
    }

    async fn save_collection(&self, name: &str, records: Vec<Value>) -> AppResult<()> {
        sqlx::query(UPSERT_COLLECTION)
            .bind(name)
            .bind(Json(records))
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn commit(&self, writes: Vec<CollectionWrite>) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        for write in writes {
            sqlx::query(UPSERT_COLLECTION)
                .bind(&write.name)
                .bind(Json(write.records))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
