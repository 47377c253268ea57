//! Acopio Maquipaes stock ledger
//!
//! Tracks construction materials held at the depot, applies entries and exits
//! from trip reports and reconciles inventory against reports and sales.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::{ReconciliationService, ReportTranslator, StockLedger};
use storage::CollectionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn CollectionStore>,
    pub ledger: Arc<StockLedger>,
    pub translator: Arc<ReportTranslator>,
    pub reconciliation: ReconciliationService,
}

impl AppState {
    /// Wire every service to one store
    pub fn new(config: Config, store: Arc<dyn CollectionStore>) -> AppResult<Self> {
        let depot = config.depot.matcher()?;
        let ledger = Arc::new(StockLedger::with_capabilities(
            store.clone(),
            config.ledger.capability_table(),
        ));
        let translator = Arc::new(ReportTranslator::new(
            ledger.clone(),
            depot.clone(),
            config.ledger.unspecified_material_label.clone(),
        ));
        let reconciliation = ReconciliationService::new(store.clone(), depot);

        Ok(Self {
            config: Arc::new(config),
            store,
            ledger,
            translator,
            reconciliation,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Acopio Maquipaes Stock Ledger API v1"
}
