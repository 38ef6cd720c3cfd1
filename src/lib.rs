// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Rally planner: scoring and route planning for motorcycle rallies
//!
//! This crate provides the backend API for organizers placing bonus points
//! and combinations, and for riders scoring runs and ordering the
//! waypoints of their route legs.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::RallyDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: RallyDb,
}
