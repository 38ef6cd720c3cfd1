// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use rally_planner::db::StoreError;
use rally_planner::error::AppError;
use rally_planner::services::waypoint_sequence::{RemoteCall, SequenceError, SequenceOperation};

fn sequence_error(confirmed: Vec<RemoteCall>) -> SequenceError {
    SequenceError {
        operation: SequenceOperation::MoveUp,
        step: confirmed.len() + 1,
        failed_call: RemoteCall::SetSequenceOrder {
            waypoint_id: "C".to_string(),
            order: 2,
        },
        confirmed,
        local_state: Vec::new(),
        source: StoreError::Backend("timeout".to_string()),
    }
}

#[test]
fn test_untouched_sequence_failure_is_bad_gateway() {
    let err = AppError::from(sequence_error(Vec::new()));
    assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_partial_sequence_failure_is_conflict() {
    let err = AppError::from(sequence_error(vec![RemoteCall::SetSequenceOrder {
        waypoint_id: "B".to_string(),
        order: 3,
    }]));
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
}

#[test]
fn test_store_errors() {
    let err = AppError::from(StoreError::NotFound("waypoint X".to_string()));
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    let err = AppError::from(StoreError::Backend("unavailable".to_string()));
    assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_validation_message_lists_violations() {
    let err = AppError::Validation(vec!["code: length".to_string(), "points: range".to_string()]);
    assert_eq!(
        err.to_string(),
        "Validation failed: code: length; points: range"
    );
    assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
}
