// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod bonus_point;
pub mod combination;
pub mod coordinate;
pub mod rally;
pub mod waypoint;

pub use bonus_point::{BonusCategory, BonusPoint, VerificationRequirement};
pub use combination::{Combination, CombinationDraft, CombinationError, CompletionRule};
pub use coordinate::{Coordinate, CoordinateError};
pub use rally::Rally;
pub use waypoint::Waypoint;
