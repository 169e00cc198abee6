use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use thiserror::Error;
use tracing::error;

use crate::models::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Insufficient shares: cannot sell {requested} of {ticker_symbol}, only {available} held")]
    InsufficientShares {
        ticker_symbol: String,
        requested: i64,
        available: i64,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn position_not_found(ticker_symbol: &str) -> Self {
        AppError::NotFound(format!("Position {} not found", ticker_symbol))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientShares { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Db(e) => {
                error!("Storage failure: {:?}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::failed(message))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}
