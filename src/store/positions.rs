use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use crate::db;
use crate::errors::AppError;
use crate::models::{CreatePosition, Position, PositionPatch};
use crate::store::PositionStore;

/// Postgres-backed store; the unique index on `ticker_symbol` backs the
/// one-record-per-ticker invariant.
#[derive(Clone)]
pub struct PgPositionStore {
    pool: PgPool,
}

impl PgPositionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error, ticker_symbol: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!("Position {} already exists", ticker_symbol));
        }
    }
    error!("Write to positions failed for {}: {:?}", ticker_symbol, e);
    AppError::Db(e)
}

#[async_trait]
impl PositionStore for PgPositionStore {
    async fn insert(&self, input: CreatePosition) -> Result<Position, AppError> {
        let ticker_symbol = input.ticker_symbol.clone();
        db::position_queries::insert(&self.pool, Position::new(input))
            .await
            .map_err(|e| map_write_error(e, &ticker_symbol))
    }

    async fn find_by_symbol(&self, ticker_symbol: &str) -> Result<Option<Position>, AppError> {
        Ok(db::position_queries::fetch_by_symbol(&self.pool, ticker_symbol).await?)
    }

    async fn find_all(&self) -> Result<Vec<Position>, AppError> {
        Ok(db::position_queries::fetch_all(&self.pool).await?)
    }

    async fn update_by_symbol(
        &self,
        ticker_symbol: &str,
        patch: &PositionPatch,
    ) -> Result<u64, AppError> {
        let target = patch.ticker_symbol.as_deref().unwrap_or(ticker_symbol);
        db::position_queries::update_by_symbol(&self.pool, ticker_symbol, patch)
            .await
            .map_err(|e| map_write_error(e, target))
    }

    async fn delete_by_symbol(&self, ticker_symbol: &str) -> Result<u64, AppError> {
        Ok(db::position_queries::delete_by_symbol(&self.pool, ticker_symbol).await?)
    }
}
