// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use rally_planner::config::Config;
use rally_planner::db::{FirestoreDb, MemoryDb, RallyDb};
use rally_planner::routes::create_router;
use rally_planner::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: RallyDb::Memory(MemoryDb::new()),
    });

    (create_router(state.clone()), state)
}

/// Send a request and return the status with the parsed JSON body
/// (`Value::Null` for empty bodies).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Create a rally through the API and return its id.
#[allow(dead_code)]
pub async fn create_rally(app: &axum::Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/rallies",
        Some(serde_json::json!({
            "name": "Four Corners Tour",
            "start_date": "2026-06-01",
            "end_date": "2026-06-03"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

/// Create a photo bonus point and return its id.
#[allow(dead_code)]
pub async fn create_bonus_point(
    app: &axum::Router,
    rally_id: &str,
    code: &str,
    points: u32,
    lat: f64,
    lon: f64,
) -> String {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/rallies/{}/bonus-points", rally_id),
        Some(serde_json::json!({
            "name": format!("Bonus {}", code),
            "code": code,
            "coordinate": {"latitude": lat, "longitude": lon},
            "points": points,
            "verification": "PHOTO"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}
