//! Configuration management for the Acopio stock ledger
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with ACOPIO_ prefix

use std::collections::HashMap;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{CapabilityTable, DepotMatcher, MachineCapability, UNSPECIFIED_MATERIAL};

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Storage collaborator configuration
    pub storage: StorageConfig,

    /// Depot recognition
    pub depot: DepotConfig,

    /// Ledger rules
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which collection store backs the ledger
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// PostgreSQL connection URL, required for the postgres backend
    pub database_url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DepotConfig {
    /// Canonical depot name, matched as a prefix
    pub canonical_name: String,

    /// Tokens that must all appear in a location naming the depot
    pub tokens: Vec<String>,
}

impl DepotConfig {
    pub fn matcher(&self) -> AppResult<DepotMatcher> {
        DepotMatcher::new(&self.canonical_name, &self.tokens)
            .map_err(|e| AppError::Configuration(e.to_string()))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Material name used for trips without a description
    pub unspecified_material_label: String,

    /// Extra or overriding machine capabilities, keyed by machine type
    #[serde(default)]
    pub capabilities: HashMap<String, MachineCapability>,
}

impl LedgerConfig {
    /// Standard table with configured overrides applied
    pub fn capability_table(&self) -> CapabilityTable {
        let mut table = CapabilityTable::standard();
        for (machine_type, capability) in &self.capabilities {
            table.insert(machine_type, *capability);
        }
        table
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            unspecified_material_label: UNSPECIFIED_MATERIAL.to_string(),
            capabilities: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ACOPIO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.backend", "memory")?
            .set_default("storage.max_connections", 10)?
            .set_default("storage.min_connections", 2)?
            .set_default("depot.canonical_name", DepotMatcher::DEFAULT_CANONICAL_NAME)?
            .set_default(
                "depot.tokens",
                DepotMatcher::DEFAULT_TOKENS
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>(),
            )?
            .set_default("ledger.unspecified_material_label", UNSPECIFIED_MATERIAL)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ACOPIO_ prefix)
            .add_source(
                Environment::with_prefix("ACOPIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            depot: DepotConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            canonical_name: DepotMatcher::DEFAULT_CANONICAL_NAME.to_string(),
            tokens: DepotMatcher::DEFAULT_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}
