use sqlx::{PgPool, Postgres, QueryBuilder};
use crate::models::{Position, PositionPatch};

const POSITION_COLUMNS: &str = "id, ticker_symbol, avg_buy_price, no_of_shares, created_at, updated_at";

pub async fn insert(pool: &PgPool, position: Position) -> Result<Position, sqlx::Error> {
    sqlx::query_as::<_, Position>(&format!(
        "INSERT INTO positions ({POSITION_COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {POSITION_COLUMNS}"
    ))
        .bind(position.id)
        .bind(position.ticker_symbol)
        .bind(position.avg_buy_price)
        .bind(position.no_of_shares)
        .bind(position.created_at)
        .bind(position.updated_at)
        .fetch_one(pool)
        .await
}

pub async fn fetch_by_symbol(pool: &PgPool, ticker_symbol: &str) -> Result<Option<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(&format!(
        "SELECT {POSITION_COLUMNS}
         FROM positions
         WHERE ticker_symbol = $1
         ORDER BY created_at ASC
         LIMIT 1"
    ))
        .bind(ticker_symbol)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(&format!(
        "SELECT {POSITION_COLUMNS} FROM positions ORDER BY created_at ASC, id ASC"
    ))
        .fetch_all(pool)
        .await
}

/// Writes the present fields of `patch` in one statement.
pub async fn update_by_symbol(
    pool: &PgPool,
    ticker_symbol: &str,
    patch: &PositionPatch,
) -> Result<u64, sqlx::Error> {
    if patch.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE positions SET updated_at = NOW()");
    if let Some(ticker) = &patch.ticker_symbol {
        builder.push(", ticker_symbol = ").push_bind(ticker.clone());
    }
    if let Some(price) = patch.avg_buy_price {
        builder.push(", avg_buy_price = ").push_bind(price);
    }
    if let Some(shares) = patch.no_of_shares {
        builder.push(", no_of_shares = ").push_bind(shares);
    }
    builder.push(" WHERE ticker_symbol = ").push_bind(ticker_symbol.to_string());

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_symbol(pool: &PgPool, ticker_symbol: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM positions WHERE ticker_symbol = $1")
        .bind(ticker_symbol)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
