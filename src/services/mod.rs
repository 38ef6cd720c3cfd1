// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod export;
pub mod geomath;
pub mod routing;
pub mod scoring;
pub mod waypoint_sequence;

pub use geomath::DistanceUnit;
pub use routing::{estimate_leg, LegEstimate};
pub use scoring::{score_run, CombinationProgress, RunScore};
pub use waypoint_sequence::{SequenceError, WaypointSequenceManager};
