use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One open holding, keyed by ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: uuid::Uuid,
    pub ticker_symbol: String,
    pub avg_buy_price: f64,
    pub no_of_shares: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Position {
    pub(crate) fn new(input: CreatePosition) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            ticker_symbol: input.ticker_symbol,
            avg_buy_price: input.avg_buy_price,
            no_of_shares: input.no_of_shares,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies every present field of `patch` in place.
    pub(crate) fn apply(&mut self, patch: &PositionPatch) {
        if let Some(ticker) = &patch.ticker_symbol {
            self.ticker_symbol = ticker.clone();
        }
        if let Some(price) = patch.avg_buy_price {
            self.avg_buy_price = price;
        }
        if let Some(shares) = patch.no_of_shares {
            self.no_of_shares = shares;
        }
        self.updated_at = chrono::Utc::now();
    }
}

/// A position as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub ticker_symbol: String,
    pub avg_buy_price: f64,
    pub no_of_shares: i64,
}

impl From<Position> for PositionSummary {
    fn from(position: Position) -> Self {
        Self {
            ticker_symbol: position.ticker_symbol,
            avg_buy_price: position.avg_buy_price,
            no_of_shares: position.no_of_shares,
        }
    }
}

/// One entry of the initial portfolio batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePosition {
    pub ticker_symbol: String,
    pub avg_buy_price: f64,
    pub no_of_shares: i64,
}

/// Field-level patch handed to storage. `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionPatch {
    pub ticker_symbol: Option<String>,
    pub avg_buy_price: Option<f64>,
    pub no_of_shares: Option<i64>,
}

impl PositionPatch {
    pub fn is_empty(&self) -> bool {
        self.ticker_symbol.is_none() && self.avg_buy_price.is_none() && self.no_of_shares.is_none()
    }
}

/// Body of `PATCH /update-trades`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePosition {
    pub current_ticker_symbol: String,
    #[serde(default)]
    pub new_ticker_symbol: Option<String>,
    #[serde(default)]
    pub new_avg_buy_price: Option<f64>,
    #[serde(default)]
    pub new_no_of_shares: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeSummary {
    pub inserted: usize,
    pub merged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsAffected {
    pub records_affected: u64,
}
