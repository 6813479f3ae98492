//! HTTP API over the static provider.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use swingscope::config::Config;
use swingscope::sources::StaticProvider;
use swingscope::types::{Bar, Fundamentals};
use swingscope::{api, AppState};
use tower::ServiceExt;

const DAY_MS: i64 = 86_400_000;

fn trend(count: usize, start: f64, step: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let close = start + i as f64 * step + (i as f64 * 0.7).sin();
            Bar::new(i as i64 * DAY_MS, close, close + 1.5, close - 1.5, close, 50_000.0)
        })
        .collect()
}

fn setup() -> (Router, AppState) {
    let provider = StaticProvider::new()
        .with_bars("AAPL", trend(200, 150.0, 0.3))
        .with_bars("MSFT", trend(200, 300.0, -0.2))
        .with_bars("IPO", trend(5, 20.0, 0.1))
        .with_sector("AAPL", "Technology");
    provider.set_fundamentals(
        "AAPL",
        Fundamentals {
            trailing_pe: Some(28.0),
            price_to_sales: Some(6.0),
            market_cap: Some(2.5e12),
        },
    );

    let state = AppState::new(Config::default(), Arc::new(provider));
    let app = api::router().with_state(state.clone());
    (app, state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "static");
}

#[tokio::test]
async fn test_analyze_reports_failures_individually() {
    let (app, state) = setup();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/analyze",
        Some(json!({"symbols": ["aapl", "IPO", "NOPE", "msft"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["data"]["results"].as_array().unwrap();
    let tickers: Vec<_> = results.iter().map(|r| r["ticker"].as_str().unwrap()).collect();
    assert_eq!(tickers, vec!["AAPL", "MSFT"]);
    assert_eq!(results[0]["sector"], "Technology");
    assert!(results[0]["signal"]["opinion"].is_string());
    assert!(results[0]["score"]["bucket"].is_string());

    let failures = body["data"]["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0]["symbol"], "IPO");
    assert_eq!(failures[1]["symbol"], "NOPE");

    // Ad-hoc analysis does not track anything.
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn test_analyze_rejects_bad_params() {
    let (app, _) = setup();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/analyze",
        Some(json!({"symbols": ["AAPL"], "params": {"macd_short": 30}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _) = send(&app, Method::POST, "/api/analyze", Some(json!({"symbols": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rejects_oversized_period() {
    let (app, _) = setup();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/analyze",
        Some(json!({"symbols": ["AAPL"], "params": {"rsi_period": u64::MAX}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_watchlist_lifecycle() {
    let (app, state) = setup();

    let (status, body) =
        send(&app, Method::POST, "/api/watchlist", Some(json!({"symbol": "aapl"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["ticker"], "AAPL");
    assert_eq!(state.store.len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/watchlist/aapl", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ticker"], "AAPL");

    let (status, body) = send(&app, Method::POST, "/api/watchlist/AAPL/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ticker"], "AAPL");
    assert_eq!(state.store.len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/watchlist", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, "/api/watchlist/AAPL", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/watchlist/AAPL", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watchlist_add_errors() {
    let (app, state) = setup();

    let (status, _) =
        send(&app, Method::POST, "/api/watchlist", Some(json!({"symbol": "NOPE"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
        send(&app, Method::POST, "/api/watchlist", Some(json!({"symbol": "IPO"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("insufficient history"));

    let (status, _) = send(&app, Method::POST, "/api/watchlist/MSFT/refresh", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn test_scan_filters_tracked() {
    let (app, _) = setup();
    for symbol in ["AAPL", "MSFT"] {
        let (status, _) =
            send(&app, Method::POST, "/api/watchlist", Some(json!({"symbol": symbol}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/scan", None).await;
    assert_eq!(status, StatusCode::OK);
    let scores: Vec<f64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["score"]["score"].as_f64().unwrap())
        .collect();
    assert_eq!(scores.len(), 2);
    assert!(scores[0] >= scores[1]);

    let (status, body) = send(&app, Method::GET, "/api/scan?sector=Technology", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/api/scan?buckets=great", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_gems_respects_criteria() {
    let (app, _) = setup();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/gems",
        Some(json!({
            "symbols": ["AAPL", "MSFT", "IPO"],
            "criteria": {"min_score": 0.0, "min_high_gap_pct": 0.0, "buckets": ["strong_buy", "watch", "caution", "avoid"]}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let gems = body["data"].as_array().unwrap();
    // MSFT has no fundamentals, so it cannot pass the valuation screen.
    assert_eq!(gems.len(), 1);
    assert_eq!(gems[0]["ticker"], "AAPL");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/gems",
        Some(json!({"symbols": ["AAPL"], "criteria": {"min_score": 99.0}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}
