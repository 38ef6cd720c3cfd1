// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Straight-line leg estimate.
//!
//! Placeholder for real road routing: the distance of a leg is the sum of
//! great-circle hops between consecutive placed waypoints.

use crate::models::waypoint::sort_by_sequence;
use crate::models::{Coordinate, Waypoint};
use crate::services::geomath::{self, DistanceUnit};
use geo::{Coord, LineString};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Polyline precision used by map clients (5 decimal places).
const POLYLINE_PRECISION: u32 = 5;

/// Estimated leg geometry and length.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LegEstimate {
    pub distance: f64,
    pub unit: DistanceUnit,
    /// Number of waypoints with a location
    pub placed_waypoints: usize,
    /// Waypoints skipped because they have no location
    pub unplaced_waypoints: usize,
    /// Encoded polyline through the placed waypoints, in sequence order
    pub polyline: String,
}

/// Estimate a leg through its waypoints in sequence order.
pub fn estimate_leg(
    waypoints: &[Waypoint],
    unit: DistanceUnit,
) -> Result<LegEstimate, RoutingError> {
    let mut ordered = waypoints.to_vec();
    sort_by_sequence(&mut ordered);

    // Stored documents may predate coordinate validation.
    if let Some((w, location)) = ordered
        .iter()
        .filter_map(|w| w.location.map(|l| (w, l)))
        .find(|(_, l)| !l.is_valid())
    {
        return Err(RoutingError::InvalidLocation {
            waypoint_id: w.id.clone(),
            location,
        });
    }
    let path: Vec<Coordinate> = ordered.iter().filter_map(|w| w.location).collect();

    let line: LineString<f64> = path.iter().map(|c| Coord::from(*c)).collect();
    let polyline = polyline::encode_coordinates(line, POLYLINE_PRECISION)
        .map_err(|e| RoutingError::Polyline(e.to_string()))?;

    Ok(LegEstimate {
        distance: geomath::path_length(&path, unit),
        unit,
        placed_waypoints: path.len(),
        unplaced_waypoints: ordered.len() - path.len(),
        polyline,
    })
}

/// Errors from leg estimation.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("waypoint {waypoint_id} location out of range: {location:?}")]
    InvalidLocation {
        waypoint_id: String,
        location: Coordinate,
    },

    #[error("Failed to encode polyline: {0}")]
    Polyline(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, order: u32, location: Option<(f64, f64)>) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            leg_id: "leg".to_string(),
            name: id.to_string(),
            sequence_order: Some(order),
            location: location.map(|(lat, lon)| Coordinate::new(lat, lon).unwrap()),
            bonus_point_id: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_estimate_follows_sequence_order() {
        let waypoints = vec![
            wp("c", 3, Some((2.0, 0.0))),
            wp("a", 1, Some((0.0, 0.0))),
            wp("b", 2, Some((1.0, 0.0))),
        ];

        let estimate = estimate_leg(&waypoints, DistanceUnit::Meters).unwrap();

        let expected = geomath::EARTH_RADIUS_METERS * 2.0_f64.to_radians();
        assert!((estimate.distance - expected).abs() < 1e-6);
        assert_eq!(estimate.placed_waypoints, 3);

        let decoded = polyline::decode_polyline(&estimate.polyline, POLYLINE_PRECISION).unwrap();
        let lats: Vec<f64> = decoded.0.iter().map(|c| c.y).collect();
        assert_eq!(lats, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_unplaced_waypoints_are_skipped() {
        let waypoints = vec![wp("a", 1, Some((0.0, 0.0))), wp("b", 2, None)];

        let estimate = estimate_leg(&waypoints, DistanceUnit::Miles).unwrap();

        assert_eq!(estimate.distance, 0.0);
        assert_eq!(estimate.unplaced_waypoints, 1);
        assert_eq!(estimate.unit, DistanceUnit::Miles);
    }

    #[test]
    fn test_out_of_range_location_names_waypoint() {
        let mut bad = wp("b", 2, None);
        bad.location = Some(Coordinate {
            latitude: 91.0,
            longitude: 0.0,
        });
        let waypoints = vec![wp("a", 1, Some((0.0, 0.0))), bad];

        let err = estimate_leg(&waypoints, DistanceUnit::Meters).unwrap_err();

        assert!(matches!(
            err,
            RoutingError::InvalidLocation { ref waypoint_id, .. } if waypoint_id == "b"
        ));
    }

    #[test]
    fn test_empty_leg() {
        let estimate = estimate_leg(&[], DistanceUnit::Meters).unwrap();
        assert_eq!(estimate.distance, 0.0);
        assert!(estimate.polyline.is_empty());
    }
}
