use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{CreatePosition, Position, PositionPatch};

pub mod memory;
pub mod positions;

pub use memory::InMemoryPositionStore;
pub use positions::PgPositionStore;

/// Durable home of position records, keyed by ticker symbol.
///
/// Implementations enforce ticker uniqueness: `insert` and a renaming
/// `update_by_symbol` fail with [`AppError::Conflict`] when the target ticker
/// is already held by another record.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn insert(&self, input: CreatePosition) -> Result<Position, AppError>;

    async fn find_by_symbol(&self, ticker_symbol: &str) -> Result<Option<Position>, AppError>;

    /// All records in insertion order.
    async fn find_all(&self) -> Result<Vec<Position>, AppError>;

    /// Returns the number of records the patch was applied to.
    async fn update_by_symbol(
        &self,
        ticker_symbol: &str,
        patch: &PositionPatch,
    ) -> Result<u64, AppError>;

    /// Returns the number of records removed.
    async fn delete_by_symbol(&self, ticker_symbol: &str) -> Result<u64, AppError>;
}
