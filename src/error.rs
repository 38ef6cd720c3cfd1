// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use crate::models::CombinationError;
use crate::services::routing::RoutingError;
use crate::services::SequenceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CombinationError> for AppError {
    fn from(err: CombinationError) -> Self {
        AppError::Validation(vec![err.to_string()])
    }
}

impl From<RoutingError> for AppError {
    fn from(err: RoutingError) -> Self {
        match err {
            // Bad stored data, not a server fault.
            RoutingError::InvalidLocation { .. } => AppError::Validation(vec![err.to_string()]),
            RoutingError::Polyline(_) => AppError::Internal(err.into()),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                Some(violations.join("; ")),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::Store(StoreError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, "not_found", Some(what.clone()))
            }
            AppError::Store(err @ StoreError::Backend(_)) => {
                tracing::error!(error = %err, "Store error");
                (StatusCode::BAD_GATEWAY, "store_error", None)
            }
            // The store was changed before the failure; the client must re-fetch.
            AppError::Sequence(err) if err.is_partial() => {
                tracing::error!(error = %err, "Waypoint sequence partially applied");
                (
                    StatusCode::CONFLICT,
                    "sequence_partially_applied",
                    Some(err.to_string()),
                )
            }
            AppError::Sequence(err) => {
                tracing::warn!(error = %err, "Waypoint sequence not applied");
                (StatusCode::BAD_GATEWAY, "store_error", Some(err.to_string()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
