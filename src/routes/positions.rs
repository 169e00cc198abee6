use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{
    ApiResponse, CreatePosition, InitializeSummary, PositionSummary, RecordsAffected, Side,
    TickerParams, TradeParams, UpdatePosition,
};
use crate::services::position_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-portfolio", post(create_portfolio))
        .route("/add-trades", patch(add_trades))
        .route("/update-trades", patch(update_trades))
        .route("/delete-trades", delete(delete_trades))
        .route("/fetch-trades", get(fetch_trades))
        .route("/fetch-portfolio", get(fetch_portfolio))
        .route("/fetch-returns", get(fetch_returns))
}

fn required_ticker(params: TickerParams) -> Result<String, AppError> {
    params
        .ticker_symbol
        .ok_or_else(|| AppError::Validation("ticker_symbol is required".into()))
}

pub async fn create_portfolio(
    State(state): State<AppState>,
    payload: Result<Json<Vec<CreatePosition>>, JsonRejection>,
) -> Result<Json<ApiResponse<InitializeSummary>>, AppError> {
    info!("POST /create-portfolio - Creating portfolio");
    let Json(entries) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let summary = position_service::initialize(state.store.as_ref(), &state.locks, entries)
        .await
        .map_err(|e| {
            error!("Failed to create portfolio: {}", e);
            e
        })?;
    Ok(Json(ApiResponse::success("portfolio created successfully", summary)))
}

pub async fn add_trades(
    State(state): State<AppState>,
    params: Result<Query<TradeParams>, QueryRejection>,
) -> Result<Json<ApiResponse<PositionSummary>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let (ticker_symbol, trade) = params.into_trade()?;
    info!("PATCH /add-trades - {} {} of {}", trade.side(), trade.quantity(), ticker_symbol);

    let position = position_service::apply_trade(state.store.as_ref(), &state.locks, &ticker_symbol, trade)
        .await
        .map_err(|e| {
            error!("Failed to apply {} on {}: {}", trade.side(), ticker_symbol, e);
            e
        })?;
    let message = match trade.side() {
        Side::Buy => "trade bought successfully",
        Side::Sell => "trade sold successfully",
    };
    Ok(Json(ApiResponse::success(message, position.into())))
}

pub async fn update_trades(
    State(state): State<AppState>,
    payload: Result<Json<UpdatePosition>, JsonRejection>,
) -> Result<Json<ApiResponse<RecordsAffected>>, AppError> {
    let Json(input) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let ticker_symbol = input.current_ticker_symbol.clone();
    info!("PATCH /update-trades - Updating {}", ticker_symbol);

    let records_affected = position_service::update(state.store.as_ref(), &state.locks, input)
        .await
        .map_err(|e| {
            error!("Failed to update {}: {}", ticker_symbol, e);
            e
        })?;
    Ok(Json(ApiResponse::success(
        "trade updated successfully",
        RecordsAffected { records_affected },
    )))
}

pub async fn delete_trades(
    State(state): State<AppState>,
    params: Result<Query<TickerParams>, QueryRejection>,
) -> Result<Json<ApiResponse<RecordsAffected>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let ticker_symbol = required_ticker(params)?;
    info!("DELETE /delete-trades - Deleting {}", ticker_symbol);

    let records_affected = position_service::delete(state.store.as_ref(), &state.locks, &ticker_symbol)
        .await
        .map_err(|e| {
            error!("Failed to delete {}: {}", ticker_symbol, e);
            e
        })?;
    Ok(Json(ApiResponse::success(
        "trade deleted successfully",
        RecordsAffected { records_affected },
    )))
}

pub async fn fetch_trades(
    State(state): State<AppState>,
    params: Result<Query<TickerParams>, QueryRejection>,
) -> Result<Json<ApiResponse<PositionSummary>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let ticker_symbol = required_ticker(params)?;
    info!("GET /fetch-trades - Fetching {}", ticker_symbol);

    let position = position_service::fetch_one(state.store.as_ref(), &ticker_symbol)
        .await
        .map_err(|e| {
            error!("Failed to fetch {}: {}", ticker_symbol, e);
            e
        })?;
    Ok(Json(ApiResponse::success("data fetched successfully", position.into())))
}

pub async fn fetch_portfolio(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PositionSummary>>>, AppError> {
    info!("GET /fetch-portfolio - Fetching all positions");
    let positions = position_service::fetch_all(state.store.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to fetch portfolio: {}", e);
            e
        })?;
    let summaries = positions.into_iter().map(PositionSummary::from).collect();
    Ok(Json(ApiResponse::success("portfolio fetched successfully", summaries)))
}

pub async fn fetch_returns(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<f64>>, AppError> {
    info!("GET /fetch-returns - Computing aggregate return");
    let returns = position_service::aggregate_return(state.store.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to compute returns: {}", e);
            e
        })?;
    Ok(Json(ApiResponse::success("returns fetched successfully", returns)))
}
