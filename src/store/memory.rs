use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::AppError;
use crate::models::{CreatePosition, Position, PositionPatch};
use crate::store::PositionStore;

/// Process-local store keeping records in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryPositionStore {
    positions: Arc<RwLock<Vec<Position>>>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.read().is_empty()
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn insert(&self, input: CreatePosition) -> Result<Position, AppError> {
        let mut positions = self.positions.write();
        if positions.iter().any(|p| p.ticker_symbol == input.ticker_symbol) {
            return Err(AppError::Conflict(format!(
                "Position {} already exists",
                input.ticker_symbol
            )));
        }
        let position = Position::new(input);
        positions.push(position.clone());
        Ok(position)
    }

    async fn find_by_symbol(&self, ticker_symbol: &str) -> Result<Option<Position>, AppError> {
        Ok(self
            .positions
            .read()
            .iter()
            .find(|p| p.ticker_symbol == ticker_symbol)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Position>, AppError> {
        Ok(self.positions.read().clone())
    }

    async fn update_by_symbol(
        &self,
        ticker_symbol: &str,
        patch: &PositionPatch,
    ) -> Result<u64, AppError> {
        if patch.is_empty() {
            return Ok(0);
        }

        let mut positions = self.positions.write();
        if !positions.iter().any(|p| p.ticker_symbol == ticker_symbol) {
            return Ok(0);
        }
        if let Some(new_ticker) = &patch.ticker_symbol {
            if new_ticker != ticker_symbol && positions.iter().any(|p| &p.ticker_symbol == new_ticker) {
                return Err(AppError::Conflict(format!(
                    "Position {} already exists",
                    new_ticker
                )));
            }
        }

        let mut affected = 0;
        for position in positions.iter_mut().filter(|p| p.ticker_symbol == ticker_symbol) {
            position.apply(patch);
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_by_symbol(&self, ticker_symbol: &str) -> Result<u64, AppError> {
        let mut positions = self.positions.write();
        let before = positions.len();
        positions.retain(|p| p.ticker_symbol != ticker_symbol);
        Ok((before - positions.len()) as u64)
    }
}
