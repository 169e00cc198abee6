use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use ticker_ledger::app;
use ticker_ledger::config::{AppConfig, StorageBackend};
use ticker_ledger::logging::{init_logging, LoggingConfig};
use ticker_ledger::state::AppState;
use ticker_ledger::store::{InMemoryPositionStore, PgPositionStore, PositionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let store: Arc<dyn PositionStore> = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!("Using Postgres position store");
            Arc::new(PgPositionStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory position store; positions are lost on shutdown");
            Arc::new(InMemoryPositionStore::new())
        }
    };

    let app = app::create_app(AppState::new(store));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Ticker ledger running at http://{}/", config.bind_addr);
    axum::serve(listener, app)
        .await?;

    Ok(())
}
