use axum::{
    Json, Router,
    routing::get,
};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

async fn health() -> Json<Value> {
    info!("GET /health - Health check");
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
