// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance on a spherical Earth (haversine).
//!
//! Callers pick one [`DistanceUnit`] per use; meters and miles are never
//! mixed within a single computation.

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3_959.0;

/// Unit a distance is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum DistanceUnit {
    #[default]
    Meters,
    Miles,
}

impl DistanceUnit {
    fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Meters => EARTH_RADIUS_METERS,
            DistanceUnit::Miles => EARTH_RADIUS_MILES,
        }
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meters" | "m" => Ok(DistanceUnit::Meters),
            "miles" | "mi" => Ok(DistanceUnit::Miles),
            other => Err(format!("unknown distance unit: {other}")),
        }
    }
}

/// Haversine distance between two coordinates in the given unit.
///
/// Inputs are expected to satisfy the coordinate range invariant.
pub fn distance_in(a: Coordinate, b: Coordinate, unit: DistanceUnit) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let c = 2.0 * h.min(1.0).sqrt().asin();

    unit.earth_radius() * c
}

/// Haversine distance in meters.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    distance_in(a, b, DistanceUnit::Meters)
}

/// Total length of a path through consecutive coordinates.
pub fn path_length(points: &[Coordinate], unit: DistanceUnit) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_in(pair[0], pair[1], unit))
        .sum()
}
