// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route leg waypoint routes.
//!
//! Reorder and delete gestures run through [`WaypointSequenceManager`],
//! which issues one store call at a time. A partial failure is reported as
//! `409 sequence_partially_applied`; the client should re-fetch the leg.

use crate::db::WaypointStore;
use crate::error::{AppError, Result};
use crate::models::waypoint::{creation_timestamp, is_contiguous, sort_by_sequence};
use crate::models::{Coordinate, Waypoint};
use crate::services::{estimate_leg, LegEstimate, WaypointSequenceManager};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/legs/{leg_id}/waypoints",
            get(list_waypoints).post(create_waypoint),
        )
        .route(
            "/api/legs/{leg_id}/waypoints/{waypoint_id}/move-up",
            post(move_up),
        )
        .route(
            "/api/legs/{leg_id}/waypoints/{waypoint_id}/move-down",
            post(move_down),
        )
        .route(
            "/api/legs/{leg_id}/waypoints/{waypoint_id}",
            delete(delete_waypoint),
        )
        .route("/api/legs/{leg_id}/estimate", get(estimate))
}

/// Load a leg's waypoints and make sure `waypoint_id` is one of them.
async fn load_leg_with(state: &AppState, leg_id: &str, waypoint_id: &str) -> Result<Vec<Waypoint>> {
    let waypoints = state.db.list_waypoints(leg_id).await?;
    if !waypoints.iter().any(|w| w.id == waypoint_id) {
        return Err(AppError::NotFound(format!(
            "Waypoint {} not found in leg {}",
            waypoint_id, leg_id
        )));
    }
    Ok(waypoints)
}

async fn list_waypoints(
    State(state): State<Arc<AppState>>,
    Path(leg_id): Path<String>,
) -> Result<Json<Vec<Waypoint>>> {
    let mut waypoints = state.db.list_waypoints(&leg_id).await?;
    sort_by_sequence(&mut waypoints);
    if !is_contiguous(&waypoints) {
        // Left behind by an interrupted reorder; delete-and-renumber repairs it.
        tracing::warn!(leg_id = %leg_id, count = waypoints.len(), "Waypoint orders not contiguous");
    }
    Ok(Json(waypoints))
}

#[derive(Deserialize)]
struct CreateWaypointRequest {
    name: String,
    location: Option<Coordinate>,
    bonus_point_id: Option<String>,
}

/// Append a waypoint after the current last one.
async fn create_waypoint(
    State(state): State<Arc<AppState>>,
    Path(leg_id): Path<String>,
    Json(req): Json<CreateWaypointRequest>,
) -> Result<(StatusCode, Json<Waypoint>)> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation(vec!["name: must not be blank".to_string()]));
    }
    if let Some(location) = req.location {
        Coordinate::new(location.latitude, location.longitude)
            .map_err(|e| AppError::Validation(vec![format!("location: {}", e)]))?;
    }

    let existing = state.db.list_waypoints(&leg_id).await?;
    let next_order = existing
        .iter()
        .filter_map(|w| w.sequence_order)
        .max()
        .unwrap_or(0)
        .max(existing.len() as u32)
        + 1;

    let waypoint = Waypoint {
        id: uuid::Uuid::new_v4().to_string(),
        leg_id: leg_id.clone(),
        name,
        sequence_order: Some(next_order),
        location: req.location,
        bonus_point_id: req.bonus_point_id,
        created_at: creation_timestamp(),
    };
    state.db.insert_waypoint(&waypoint).await?;
    tracing::info!(
        leg_id = %leg_id,
        waypoint_id = %waypoint.id,
        order = next_order,
        "Waypoint appended"
    );

    Ok((StatusCode::CREATED, Json(waypoint)))
}

async fn move_up(
    State(state): State<Arc<AppState>>,
    Path((leg_id, waypoint_id)): Path<(String, String)>,
) -> Result<Json<Vec<Waypoint>>> {
    let waypoints = load_leg_with(&state, &leg_id, &waypoint_id).await?;
    let updated = WaypointSequenceManager::new(&state.db)
        .move_up(waypoints, &waypoint_id)
        .await?;
    Ok(Json(updated))
}

async fn move_down(
    State(state): State<Arc<AppState>>,
    Path((leg_id, waypoint_id)): Path<(String, String)>,
) -> Result<Json<Vec<Waypoint>>> {
    let waypoints = load_leg_with(&state, &leg_id, &waypoint_id).await?;
    let updated = WaypointSequenceManager::new(&state.db)
        .move_down(waypoints, &waypoint_id)
        .await?;
    Ok(Json(updated))
}

async fn delete_waypoint(
    State(state): State<Arc<AppState>>,
    Path((leg_id, waypoint_id)): Path<(String, String)>,
) -> Result<Json<Vec<Waypoint>>> {
    let waypoints = load_leg_with(&state, &leg_id, &waypoint_id).await?;
    let remaining = WaypointSequenceManager::new(&state.db)
        .delete_and_renumber(waypoints, &waypoint_id)
        .await?;
    tracing::info!(
        leg_id = %leg_id,
        waypoint_id = %waypoint_id,
        remaining = remaining.len(),
        "Waypoint deleted"
    );
    Ok(Json(remaining))
}

/// Straight-line estimate through the leg's placed waypoints.
async fn estimate(
    State(state): State<Arc<AppState>>,
    Path(leg_id): Path<String>,
) -> Result<Json<LegEstimate>> {
    let waypoints = state.db.list_waypoints(&leg_id).await?;
    let estimate = estimate_leg(&waypoints, state.config.distance_unit)?;
    Ok(Json(estimate))
}
