use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{CreatePosition, InitializeSummary, Position, PositionPatch, Trade, UpdatePosition};
use crate::services::ticker_locks::TickerLocks;
use crate::store::PositionStore;

/// Fixed price every position is measured against by [`aggregate_return`].
pub const REFERENCE_PRICE: f64 = 100.0;

pub fn normalize_ticker(raw: &str) -> Result<String, AppError> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker symbol cannot be empty".into()));
    }
    Ok(ticker.to_string())
}

fn validate_price(price: f64) -> Result<f64, AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(format!("Average price must be >= 0, got {}", price)));
    }
    Ok(price)
}

fn validate_shares(shares: i64) -> Result<i64, AppError> {
    if shares < 0 {
        return Err(AppError::Validation(format!("Shares cannot be negative, got {}", shares)));
    }
    Ok(shares)
}

/// Combines a holding with newly acquired shares, returning the new share
/// count and weighted average price.
fn weighted_average(
    shares: i64,
    avg_price: f64,
    added_shares: i64,
    added_price: f64,
) -> Result<(i64, f64), AppError> {
    let total = shares
        .checked_add(added_shares)
        .ok_or_else(|| AppError::Validation("Share count overflow".into()))?;
    if total == 0 {
        return Ok((0, added_price));
    }
    let avg = (avg_price * shares as f64 + added_price * added_shares as f64) / total as f64;
    if !avg.is_finite() {
        return Err(AppError::Validation("Average price is out of range".into()));
    }
    Ok((total, avg))
}

/// Loads the initial portfolio. Entries are committed one at a time, so a
/// failure leaves everything before it in place.
pub async fn initialize(
    store: &dyn PositionStore,
    locks: &TickerLocks,
    entries: Vec<CreatePosition>,
) -> Result<InitializeSummary, AppError> {
    let mut summary = InitializeSummary { inserted: 0, merged: 0 };

    for (index, entry) in entries.into_iter().enumerate() {
        match initialize_entry(store, locks, entry).await {
            Ok(true) => summary.inserted += 1,
            Ok(false) => summary.merged += 1,
            Err(e) => {
                if index > 0 {
                    warn!(
                        "Portfolio initialization stopped at entry {}; {} earlier entries stay committed",
                        index, index
                    );
                }
                return Err(e);
            }
        }
    }

    info!(
        "Initialized portfolio: {} inserted, {} merged",
        summary.inserted, summary.merged
    );
    Ok(summary)
}

/// Returns `true` when a new record was inserted, `false` when the entry was
/// merged into an existing one.
async fn initialize_entry(
    store: &dyn PositionStore,
    locks: &TickerLocks,
    entry: CreatePosition,
) -> Result<bool, AppError> {
    let ticker_symbol = normalize_ticker(&entry.ticker_symbol)?;
    let avg_buy_price = validate_price(entry.avg_buy_price)?;
    let no_of_shares = validate_shares(entry.no_of_shares)?;

    let _guard = locks.lock(&ticker_symbol).await;
    match store.find_by_symbol(&ticker_symbol).await? {
        None => {
            store
                .insert(CreatePosition {
                    ticker_symbol,
                    avg_buy_price,
                    no_of_shares,
                })
                .await?;
            Ok(true)
        }
        Some(existing) => {
            let (shares, price) = weighted_average(
                existing.no_of_shares,
                existing.avg_buy_price,
                no_of_shares,
                avg_buy_price,
            )?;
            info!("Merging duplicate entry for {} into existing position", ticker_symbol);
            store
                .update_by_symbol(
                    &ticker_symbol,
                    &PositionPatch {
                        avg_buy_price: Some(price),
                        no_of_shares: Some(shares),
                        ..Default::default()
                    },
                )
                .await?;
            Ok(false)
        }
    }
}

/// Applies a buy or sell and returns the position as written.
pub async fn apply_trade(
    store: &dyn PositionStore,
    locks: &TickerLocks,
    ticker_symbol: &str,
    trade: Trade,
) -> Result<Position, AppError> {
    let ticker_symbol = normalize_ticker(ticker_symbol)?;
    if trade.quantity() <= 0 {
        return Err(AppError::Validation("Trade quantity must be > 0".into()));
    }

    let _guard = locks.lock(&ticker_symbol).await;
    let current = store
        .find_by_symbol(&ticker_symbol)
        .await?
        .ok_or_else(|| AppError::position_not_found(&ticker_symbol))?;

    let patch = match trade {
        Trade::Buy { quantity, price } => {
            let price = validate_price(price)?;
            let (shares, avg) =
                weighted_average(current.no_of_shares, current.avg_buy_price, quantity, price)?;
            PositionPatch {
                avg_buy_price: Some(avg),
                no_of_shares: Some(shares),
                ..Default::default()
            }
        }
        Trade::Sell { quantity } => {
            if quantity > current.no_of_shares {
                return Err(AppError::InsufficientShares {
                    ticker_symbol,
                    requested: quantity,
                    available: current.no_of_shares,
                });
            }
            PositionPatch {
                no_of_shares: Some(current.no_of_shares - quantity),
                ..Default::default()
            }
        }
    };

    if store.update_by_symbol(&ticker_symbol, &patch).await? == 0 {
        return Err(AppError::position_not_found(&ticker_symbol));
    }

    let mut updated = current;
    updated.apply(&patch);
    info!(
        "Applied {} of {} {}: {} shares @ {:.4}",
        trade.side(),
        trade.quantity(),
        ticker_symbol,
        updated.no_of_shares,
        updated.avg_buy_price
    );
    Ok(updated)
}

/// Overwrites the fields present in `input`. A missing ticker is a no-op
/// reporting zero records affected.
pub async fn update(
    store: &dyn PositionStore,
    locks: &TickerLocks,
    input: UpdatePosition,
) -> Result<u64, AppError> {
    let current = normalize_ticker(&input.current_ticker_symbol)?;
    let patch = PositionPatch {
        ticker_symbol: input
            .new_ticker_symbol
            .as_deref()
            .map(normalize_ticker)
            .transpose()?,
        avg_buy_price: input.new_avg_buy_price.map(validate_price).transpose()?,
        no_of_shares: input.new_no_of_shares.map(validate_shares).transpose()?,
    };

    let mut tickers = vec![current.as_str()];
    if let Some(new_ticker) = patch.ticker_symbol.as_deref() {
        tickers.push(new_ticker);
    }
    let _guards = locks.lock_many(&tickers).await;

    let affected = store.update_by_symbol(&current, &patch).await?;
    if affected == 0 {
        info!("Update for {} matched no position", current);
    }
    Ok(affected)
}

pub async fn delete(
    store: &dyn PositionStore,
    locks: &TickerLocks,
    ticker_symbol: &str,
) -> Result<u64, AppError> {
    let ticker_symbol = normalize_ticker(ticker_symbol)?;
    let _guard = locks.lock(&ticker_symbol).await;
    store.delete_by_symbol(&ticker_symbol).await
}

pub async fn fetch_one(store: &dyn PositionStore, ticker_symbol: &str) -> Result<Position, AppError> {
    let ticker_symbol = normalize_ticker(ticker_symbol)?;
    store
        .find_by_symbol(&ticker_symbol)
        .await?
        .ok_or_else(|| AppError::position_not_found(&ticker_symbol))
}

pub async fn fetch_all(store: &dyn PositionStore) -> Result<Vec<Position>, AppError> {
    store.find_all().await
}

/// Distance of a position's cost basis from [`REFERENCE_PRICE`], scaled by
/// its share count. The comparison is inclusive at the reference price.
pub fn position_return(position: &Position) -> f64 {
    let distance = if position.avg_buy_price <= REFERENCE_PRICE {
        REFERENCE_PRICE - position.avg_buy_price
    } else {
        position.avg_buy_price - REFERENCE_PRICE
    };
    distance * position.no_of_shares as f64
}

pub async fn aggregate_return(store: &dyn PositionStore) -> Result<f64, AppError> {
    let positions = store.find_all().await?;
    Ok(positions.iter().map(position_return).sum())
}
