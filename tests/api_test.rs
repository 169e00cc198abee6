/// HTTP-level tests for the portfolio endpoints.
///
/// The router is driven in-process with an in-memory store, so no database
/// or listening socket is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use ticker_ledger::app::create_app;
use ticker_ledger::state::AppState;
use ticker_ledger::store::InMemoryPositionStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_app() -> Router {
    create_app(AppState::new(Arc::new(InMemoryPositionStore::new())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create(app: &Router, entries: Value) -> (StatusCode, Value) {
    send(app, "POST", "/create-portfolio", Some(entries)).await
}

// ---------------------------------------------------------------------------
// Portfolio lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_fetch_portfolio() {
    let app = test_app();

    let (status, body) = create(
        &app,
        json!([
            {"ticker_symbol": "AAA", "avg_buy_price": 80.0, "no_of_shares": 10},
            {"ticker_symbol": "BBB", "avg_buy_price": 120.0, "no_of_shares": 5}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "portfolio created successfully");
    assert_eq!(body["data"], json!({"inserted": 2, "merged": 0}));

    let (status, body) = send(&app, "GET", "/fetch-portfolio", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            {"ticker_symbol": "AAA", "avg_buy_price": 80.0, "no_of_shares": 10},
            {"ticker_symbol": "BBB", "avg_buy_price": 120.0, "no_of_shares": 5}
        ])
    );

    let (_, body) = send(&app, "GET", "/fetch-returns", None).await;
    assert_eq!(body["message"], "returns fetched successfully");
    assert_eq!(body["data"], json!(300.0));
}

#[tokio::test]
async fn test_trade_scenario() {
    let app = test_app();
    create(
        &app,
        json!([{"ticker_symbol": "TICK", "avg_buy_price": 50.0, "no_of_shares": 10}]),
    )
    .await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/add-trades?stock_type=BUY&ticker_symbol=TICK&count=10&new_stock_price=70",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "trade bought successfully");
    assert_eq!(body["data"]["no_of_shares"], 20);
    assert_eq!(body["data"]["avg_buy_price"], json!(60.0));

    let (status, body) = send(
        &app,
        "PATCH",
        "/add-trades?stock_type=sell&ticker_symbol=TICK&count=25",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "failed");
    assert!(body.get("data").is_none());

    let (_, body) = send(&app, "GET", "/fetch-trades?ticker_symbol=TICK", None).await;
    assert_eq!(
        body["data"],
        json!({"ticker_symbol": "TICK", "avg_buy_price": 60.0, "no_of_shares": 20})
    );

    let (status, body) = send(
        &app,
        "PATCH",
        "/add-trades?stock_type=sell&ticker_symbol=TICK&count=20",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "trade sold successfully");
    assert_eq!(body["data"]["no_of_shares"], 0);
    assert_eq!(body["data"]["avg_buy_price"], json!(60.0));
}

#[tokio::test]
async fn test_update_and_delete() {
    let app = test_app();
    create(
        &app,
        json!([{"ticker_symbol": "AAA", "avg_buy_price": 10.0, "no_of_shares": 10}]),
    )
    .await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/update-trades",
        Some(json!({
            "current_ticker_symbol": "AAA",
            "new_ticker_symbol": "AAB",
            "new_no_of_shares": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "trade updated successfully");
    assert_eq!(body["data"]["records_affected"], 1);

    let (_, body) = send(&app, "GET", "/fetch-trades?ticker_symbol=AAB", None).await;
    assert_eq!(
        body["data"],
        json!({"ticker_symbol": "AAB", "avg_buy_price": 10.0, "no_of_shares": 0})
    );

    let (status, body) = send(&app, "DELETE", "/delete-trades?ticker_symbol=AAB", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "trade deleted successfully");
    assert_eq!(body["data"]["records_affected"], 1);

    let (status, body) = send(&app, "DELETE", "/delete-trades?ticker_symbol=AAB", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["records_affected"], 0);
}

#[tokio::test]
async fn test_update_missing_ticker_succeeds() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "PATCH",
        "/update-trades",
        Some(json!({"current_ticker_symbol": "GHOST", "new_avg_buy_price": 3.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records_affected"], 0);
}

// ---------------------------------------------------------------------------
// Failure envelopes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fetch_missing_ticker_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/fetch-trades?ticker_symbol=NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["message"], "Position NOPE not found");
}

#[tokio::test]
async fn test_trade_on_missing_ticker_is_not_found() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "PATCH",
        "/add-trades?stock_type=buy&ticker_symbol=NOPE&count=1&new_stock_price=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "failed");
}

#[tokio::test]
async fn test_malformed_requests_return_validation_envelopes() {
    let app = test_app();

    let cases = [
        ("PATCH", "/add-trades?ticker_symbol=AAA&count=1"),
        ("PATCH", "/add-trades?stock_type=hold&ticker_symbol=AAA&count=1"),
        ("PATCH", "/add-trades?stock_type=buy&ticker_symbol=AAA&count=ten&new_stock_price=1"),
        ("PATCH", "/add-trades?stock_type=buy&ticker_symbol=AAA&count=1"),
        ("GET", "/fetch-trades"),
        ("DELETE", "/delete-trades"),
        ("DELETE", "/delete-trades?ticker_symbol=%20%20"),
    ];
    for (method, uri) in cases {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["status"], "failed", "{} {}", method, uri);
    }

    let (status, body) = create(&app, json!({"ticker_symbol": "not-a-list"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");

    let (status, body) = send(&app, "PATCH", "/update-trades", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
}

#[tokio::test]
async fn test_partial_batch_failure_keeps_earlier_entries() {
    let app = test_app();

    let (status, body) = create(
        &app,
        json!([
            {"ticker_symbol": "AAA", "avg_buy_price": 1.0, "no_of_shares": 1},
            {"ticker_symbol": "BBB", "avg_buy_price": -5.0, "no_of_shares": 1},
            {"ticker_symbol": "CCC", "avg_buy_price": 1.0, "no_of_shares": 1}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");

    let (_, body) = send(&app, "GET", "/fetch-portfolio", None).await;
    let tickers: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["ticker_symbol"].as_str().unwrap())
        .collect();
    assert_eq!(tickers, vec!["AAA"]);
}

#[tokio::test]
async fn test_rename_conflict() {
    let app = test_app();
    create(
        &app,
        json!([
            {"ticker_symbol": "AAA", "avg_buy_price": 1.0, "no_of_shares": 1},
            {"ticker_symbol": "BBB", "avg_buy_price": 2.0, "no_of_shares": 2}
        ]),
    )
    .await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/update-trades",
        Some(json!({"current_ticker_symbol": "AAA", "new_ticker_symbol": "BBB"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "failed");
}
