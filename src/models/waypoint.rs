// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waypoint model: a planned stop within a route leg.

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Waypoint stored in the `waypoints` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Waypoint {
    /// Opaque identifier (also used as document ID)
    pub id: String,
    /// Owning leg
    pub leg_id: String,
    /// Display name
    pub name: String,
    /// 1-based position within the leg; missing orders sort last
    #[serde(default)]
    pub sequence_order: Option<u32>,
    /// Location, if the stop has been placed on the map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    /// Bonus point this stop targets, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_point_id: Option<String>,
    /// When the stop was added (RFC 3339, fixed nanosecond precision so
    /// that string order is creation order)
    #[serde(default)]
    pub created_at: String,
}

/// Creation timestamp in the format stored in `created_at`.
pub fn creation_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

/// Sort waypoints by sequence order, missing orders last.
///
/// The sort is stable: ties keep their original relative position. Ids
/// carry no ordering meaning and are never compared.
pub fn sort_by_sequence(waypoints: &mut [Waypoint]) {
    waypoints.sort_by_key(|w| (w.sequence_order.is_none(), w.sequence_order));
}

/// Whether the orders form exactly 1..=N in list order.
pub fn is_contiguous(waypoints: &[Waypoint]) -> bool {
    waypoints
        .iter()
        .enumerate()
        .all(|(i, w)| w.sequence_order == Some(i as u32 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, order: Option<u32>) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            leg_id: "leg-1".to_string(),
            name: id.to_string(),
            sequence_order: order,
            location: None,
            bonus_point_id: None,
            created_at: String::new(),
        }
    }

    fn ids(list: &[Waypoint]) -> Vec<&str> {
        list.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn test_missing_orders_sort_last_and_stable() {
        let mut list = vec![
            wp("z", None),
            wp("b", Some(2)),
            wp("y", None),
            wp("a", Some(2)),
            wp("c", Some(1)),
        ];
        sort_by_sequence(&mut list);
        assert_eq!(ids(&list), vec!["c", "b", "a", "z", "y"]);
    }

    #[test]
    fn test_is_contiguous() {
        assert!(is_contiguous(&[]));
        assert!(is_contiguous(&[wp("a", Some(1)), wp("b", Some(2))]));
        assert!(!is_contiguous(&[wp("a", Some(1)), wp("b", Some(3))]));
        assert!(!is_contiguous(&[wp("a", Some(1)), wp("b", None)]));
    }
}
