// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rally, bonus point, combination and scoring API tests (in-memory store).

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{create_bonus_point, create_rally, create_test_app, send};

#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_rally_round_trip() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;

    let (status, body) = send(&app, "GET", &format!("/api/rallies/{}", rally_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Four Corners Tour");

    let (status, _) = send(&app, "GET", "/api/rallies/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rally_dates_validated() {
    let (app, _) = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/rallies",
        Some(json!({"name": "Backwards", "start_date": "2026-06-03", "end_date": "2026-06-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn test_invalid_bonus_point_rejected() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/rallies/{}/bonus-points", rally_id),
        Some(json!({
            "name": "Too Long",
            "code": "ABCDEFG",
            "coordinate": {"latitude": 95.0, "longitude": 0.0},
            "points": 0,
            "verification": "PHOTO"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("code"), "{details}");
    assert!(details.contains("coordinate"), "{details}");
    assert!(details.contains("points"), "{details}");
}

#[tokio::test]
async fn test_code_verification_requires_code() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/rallies/{}/bonus-points", rally_id),
        Some(json!({
            "name": "Gas Stop",
            "code": "GAS",
            "coordinate": {"latitude": 37.0, "longitude": -109.0},
            "points": 10,
            "verification": "CODE"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_duplicate_code_conflicts() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;
    create_bonus_point(&app, &rally_id, "FC1", 100, 37.0, -109.0).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/rallies/{}/bonus-points", rally_id),
        Some(json!({
            "name": "Copycat",
            "code": "fc1",
            "coordinate": {"latitude": 36.0, "longitude": -109.0},
            "points": 10,
            "verification": "PHOTO"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_bonus_point_on_unknown_rally() {
    let (app, _) = create_test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/rallies/nope/bonus-points",
        Some(json!({
            "name": "Orphan",
            "code": "X1",
            "coordinate": {"latitude": 36.0, "longitude": -109.0},
            "points": 10,
            "verification": "PHOTO"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nearby_sorted_by_distance() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;
    let far = create_bonus_point(&app, &rally_id, "FAR", 10, 37.05, -109.0).await;
    let near = create_bonus_point(&app, &rally_id, "NEAR", 10, 37.01, -109.0).await;
    create_bonus_point(&app, &rally_id, "AWAY", 10, 40.0, -109.0).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!(
            "/api/rallies/{}/bonus-points/nearby?lat=37.0&lon=-109.0&radius=10000",
            rally_id
        ),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let found: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["bonus_point"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(found, vec![near.as_str(), far.as_str()]);
}

#[tokio::test]
async fn test_nearby_rejects_bad_coordinate() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/rallies/{}/bonus-points/nearby?lat=100&lon=0", rally_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_geojson_export() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;
    create_bonus_point(&app, &rally_id, "FC1", 100, 37.0, -109.0).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/rallies/{}/bonus-points/geojson", rally_id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(body["features"][0]["properties"]["code"], "FC1");
}

#[tokio::test]
async fn test_combination_rules_validated() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;
    let a = create_bonus_point(&app, &rally_id, "A", 10, 37.0, -109.0).await;
    let b = create_bonus_point(&app, &rally_id, "B", 10, 37.1, -109.0).await;
    let uri = format!("/api/rallies/{}/combinations", rally_id);

    // Legacy flags: all required with a mismatching minimum.
    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(json!({
            "name": "Pair", "points": 50, "members": [a, b],
            "all_required": true, "minimum_count": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Sequence naming a non-member.
    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(json!({
            "name": "Pair", "points": 50, "members": [a, b],
            "rule": {"type": "all_required"}, "sequence": [a, "other"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Member that does not exist in the rally.
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({
            "name": "Ghost", "points": 50, "members": [a, "ghost"],
            "rule": {"type": "all_required"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_score_run() {
    let (app, _) = create_test_app();
    let rally_id = create_rally(&app).await;
    let a = create_bonus_point(&app, &rally_id, "A", 100, 37.0, -109.0).await;
    let b = create_bonus_point(&app, &rally_id, "B", 200, 37.1, -109.0).await;
    let c = create_bonus_point(&app, &rally_id, "C", 300, 37.2, -109.0).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/rallies/{}/combinations", rally_id),
        Some(json!({
            "name": "Northbound", "points": 1000, "members": [a, b, c],
            "rule": {"type": "minimum_count", "count": 2},
            "sequence": [a, b, c]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/rallies/{}/combinations", rally_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["rule"]["type"], "minimum_count");

    let score_uri = format!("/api/rallies/{}/score", rally_id);

    // Out of order: b before a.
    let (status, body) = send(&app, "POST", &score_uri, Some(json!({"visited": [b, a]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bonus_points"], 300);
    assert_eq!(body["combination_points"], 0);
    assert_eq!(body["combinations"][0]["percentage"], 100);
    assert_eq!(body["combinations"][0]["completed"], false);

    // In order with an unrelated stop between.
    let (_, body) = send(
        &app,
        "POST",
        &score_uri,
        Some(json!({"visited": [a, "roadside", b]})),
    )
    .await;
    assert_eq!(body["combination_points"], 1000);
    assert_eq!(body["total"], 1300);
    assert_eq!(body["unknown_visits"], json!(["roadside"]));
    assert_eq!(body["combinations"][0]["remaining"], json!([]));
}
