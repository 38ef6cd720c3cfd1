// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rally content routes: rallies, bonus points, combinations and scoring.

use crate::db::RallySource;
use crate::error::{AppError, Result};
use crate::models::bonus_point::duplicate_codes;
use crate::models::{
    BonusCategory, BonusPoint, Combination, CombinationDraft, CompletionRule, Coordinate, Rally,
    VerificationRequirement,
};
use crate::services::export::bonus_points_to_geojson;
use crate::services::{score_run, RunScore};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Default search radius for nearby bonus points (meters).
const DEFAULT_NEARBY_RADIUS_METERS: f64 = 10_000.0;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rallies", post(create_rally))
        .route("/api/rallies/{rally_id}", get(get_rally))
        .route(
            "/api/rallies/{rally_id}/bonus-points",
            get(list_bonus_points).post(create_bonus_point),
        )
        .route(
            "/api/rallies/{rally_id}/bonus-points/nearby",
            get(nearby_bonus_points),
        )
        .route(
            "/api/rallies/{rally_id}/bonus-points/geojson",
            get(export_bonus_points),
        )
        .route(
            "/api/rallies/{rally_id}/combinations",
            get(list_combinations).post(create_combination),
        )
        .route("/api/rallies/{rally_id}/score", post(score))
}

async fn require_rally(state: &AppState, rally_id: &str) -> Result<Rally> {
    state
        .db
        .get_rally(rally_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Rally {} not found", rally_id)))
}

// ─── Rallies ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateRallyRequest {
    name: String,
    description: Option<String>,
    location: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

async fn create_rally(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRallyRequest>,
) -> Result<(StatusCode, Json<Rally>)> {
    let rally = Rally {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        description: req.description,
        location: req.location,
        start_date: req.start_date,
        end_date: req.end_date,
    };
    rally
        .validate()
        .map_err(|e| AppError::Validation(vec![e.to_string()]))?;

    state.db.insert_rally(&rally).await?;
    tracing::info!(rally_id = %rally.id, name = %rally.name, "Rally created");

    Ok((StatusCode::CREATED, Json(rally)))
}

async fn get_rally(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
) -> Result<Json<Rally>> {
    Ok(Json(require_rally(&state, &rally_id).await?))
}

// ─── Bonus Points ────────────────────────────────────────────

async fn list_bonus_points(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
) -> Result<Json<Vec<BonusPoint>>> {
    require_rally(&state, &rally_id).await?;
    Ok(Json(state.db.list_bonus_points(&rally_id).await?))
}

#[derive(Deserialize)]
struct CreateBonusPointRequest {
    name: String,
    code: String,
    coordinate: Coordinate,
    points: u32,
    #[serde(default)]
    category: BonusCategory,
    verification: VerificationRequirement,
    verification_code: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    description: Option<String>,
}

async fn create_bonus_point(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
    Json(req): Json<CreateBonusPointRequest>,
) -> Result<(StatusCode, Json<BonusPoint>)> {
    require_rally(&state, &rally_id).await?;

    let bonus_point = BonusPoint {
        id: uuid::Uuid::new_v4().to_string(),
        rally_id: rally_id.clone(),
        name: req.name.trim().to_string(),
        code: req.code.trim().to_string(),
        coordinate: req.coordinate,
        points: req.points,
        category: req.category,
        verification: req.verification,
        verification_code: req.verification_code,
        question: req.question,
        answer: req.answer,
        description: req.description,
    };

    let violations = bonus_point.violations();
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    let existing = state.db.list_bonus_points(&rally_id).await?;
    let duplicates = duplicate_codes(existing.iter().chain(std::iter::once(&bonus_point)));
    if !duplicates.is_empty() {
        return Err(AppError::Conflict(format!(
            "Code {} already used in this rally",
            duplicates.join(", ")
        )));
    }

    state.db.insert_bonus_point(&bonus_point).await?;
    tracing::info!(
        rally_id = %rally_id,
        bonus_point_id = %bonus_point.id,
        code = %bonus_point.code,
        "Bonus point created"
    );

    Ok((StatusCode::CREATED, Json(bonus_point)))
}

#[derive(Deserialize)]
struct NearbyQuery {
    lat: f64,
    lon: f64,
    /// Search radius in meters
    radius: Option<f64>,
}

/// A bonus point with its distance from the query location.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NearbyBonusPoint {
    pub bonus_point: BonusPoint,
    pub distance_meters: f64,
}

async fn nearby_bonus_points(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<NearbyBonusPoint>>> {
    let origin =
        Coordinate::new(query.lat, query.lon).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let radius = query.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_METERS);
    if !radius.is_finite() || radius < 0.0 {
        return Err(AppError::BadRequest(
            "radius must be a non-negative number of meters".to_string(),
        ));
    }

    require_rally(&state, &rally_id).await?;
    let mut nearby: Vec<NearbyBonusPoint> = state
        .db
        .list_bonus_points(&rally_id)
        .await?
        .into_iter()
        .map(|bp| {
            let distance_meters = bp.distance_to_coords(origin.latitude, origin.longitude);
            NearbyBonusPoint {
                bonus_point: bp,
                distance_meters,
            }
        })
        .filter(|n| n.distance_meters <= radius)
        .collect();
    nearby.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));

    Ok(Json(nearby))
}

async fn export_bonus_points(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
) -> Result<Json<geojson::FeatureCollection>> {
    require_rally(&state, &rally_id).await?;
    let points = state.db.list_bonus_points(&rally_id).await?;
    Ok(Json(bonus_points_to_geojson(&points)))
}

// ─── Combinations ────────────────────────────────────────────

async fn list_combinations(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
) -> Result<Json<Vec<Combination>>> {
    require_rally(&state, &rally_id).await?;
    Ok(Json(state.db.list_combinations(&rally_id).await?))
}

/// New combination. Either `rule` or the older `all_required` /
/// `minimum_count` pair may be given; `rule` wins when both are present.
#[derive(Deserialize)]
struct CreateCombinationRequest {
    name: String,
    description: Option<String>,
    points: u32,
    members: Vec<String>,
    rule: Option<CompletionRule>,
    all_required: Option<bool>,
    minimum_count: Option<u32>,
    sequence: Option<Vec<String>>,
}

async fn create_combination(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
    Json(req): Json<CreateCombinationRequest>,
) -> Result<(StatusCode, Json<Combination>)> {
    require_rally(&state, &rally_id).await?;

    let rule = match req.rule {
        Some(rule) => rule,
        None => CompletionRule::from_flags(
            req.all_required.unwrap_or(true),
            req.minimum_count,
            req.members.len(),
        )?,
    };

    let combination = Combination::new(CombinationDraft {
        id: uuid::Uuid::new_v4().to_string(),
        rally_id: rally_id.clone(),
        name: req.name.trim().to_string(),
        description: req.description,
        points: req.points,
        members: req.members,
        rule,
        sequence: req.sequence,
    })?;

    // Members must resolve when the combination is created. Later deletions
    // of bonus points leave dangling references, which scoring tolerates.
    let known: HashSet<String> = state
        .db
        .list_bonus_points(&rally_id)
        .await?
        .into_iter()
        .map(|bp| bp.id)
        .collect();
    let unknown: Vec<String> = combination
        .members()
        .iter()
        .filter(|m| !known.contains(*m))
        .map(|m| format!("unknown bonus point {}", m))
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Validation(unknown));
    }

    state.db.insert_combination(&combination).await?;
    tracing::info!(
        rally_id = %rally_id,
        combination_id = %combination.id(),
        members = combination.members().len(),
        "Combination created"
    );

    Ok((StatusCode::CREATED, Json(combination)))
}

// ─── Scoring ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ScoreRequest {
    /// Visited bonus point ids, in visit order
    visited: Vec<String>,
}

async fn score(
    State(state): State<Arc<AppState>>,
    Path(rally_id): Path<String>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<RunScore>> {
    require_rally(&state, &rally_id).await?;

    let bonus_points = state.db.list_bonus_points(&rally_id).await?;
    let combinations = state.db.list_combinations(&rally_id).await?;

    let result = score_run(&bonus_points, &combinations, &req.visited);
    tracing::info!(rally_id = %rally_id, total = result.total, "Run scored");

    Ok(Json(result))
}
