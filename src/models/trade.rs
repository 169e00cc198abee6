use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl FromStr for Side {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(AppError::Validation(format!(
                "stock_type must be 'buy' or 'sell', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// A validated trade against a single position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trade {
    Buy { quantity: i64, price: f64 },
    Sell { quantity: i64 },
}

impl Trade {
    pub fn side(&self) -> Side {
        match self {
            Trade::Buy { .. } => Side::Buy,
            Trade::Sell { .. } => Side::Sell,
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            Trade::Buy { quantity, .. } | Trade::Sell { quantity } => *quantity,
        }
    }
}

/// Raw query string of `PATCH /add-trades`. Everything arrives as text so
/// malformed values surface as validation errors instead of extractor rejections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeParams {
    pub stock_type: Option<String>,
    pub ticker_symbol: Option<String>,
    pub count: Option<String>,
    pub new_stock_price: Option<String>,
}

impl TradeParams {
    /// Splits the query into the ticker it targets and the validated trade.
    pub fn into_trade(self) -> Result<(String, Trade), AppError> {
        let ticker_symbol = self
            .ticker_symbol
            .ok_or_else(|| AppError::Validation("ticker_symbol is required".into()))?;
        let side: Side = self
            .stock_type
            .ok_or_else(|| AppError::Validation("stock_type is required".into()))?
            .parse()?;

        let count = self
            .count
            .ok_or_else(|| AppError::Validation("count is required".into()))?;
        let quantity: i64 = count
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("count must be an integer, got '{}'", count)))?;
        if quantity <= 0 {
            return Err(AppError::Validation("count must be > 0".into()));
        }

        let trade = match side {
            Side::Buy => {
                let raw = self
                    .new_stock_price
                    .ok_or_else(|| AppError::Validation("new_stock_price is required for buy".into()))?;
                let price: f64 = raw.trim().parse().map_err(|_| {
                    AppError::Validation(format!("new_stock_price must be a number, got '{}'", raw))
                })?;
                if !price.is_finite() || price < 0.0 {
                    return Err(AppError::Validation("new_stock_price must be >= 0".into()));
                }
                Trade::Buy { quantity, price }
            }
            // price is irrelevant to a sell
            Side::Sell => Trade::Sell { quantity },
        };

        Ok((ticker_symbol, trade))
    }
}

/// Query string carrying a single ticker symbol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickerParams {
    pub ticker_symbol: Option<String>,
}
