//! Acopio Maquipaes stock ledger - backend server

use std::{net::SocketAddr, sync::Arc};

use acopio_stock::{
    config::{Config, StorageBackend},
    create_app,
    storage::{CollectionStore, InMemoryStore, PgCollectionStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acopio_stock=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Acopio Maquipaes stock ledger");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Storage backend: {}", config.storage.backend.as_str());

    let store: Arc<dyn CollectionStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let store = PgCollectionStore::connect(&config.storage).await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(store.pool()).await?;
                tracing::info!("Migrations completed");
            }

            Arc::new(store)
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(config, store)?;
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
