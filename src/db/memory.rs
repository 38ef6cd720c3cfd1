// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Used for local development and the HTTP tests. Each call touches a
//! single record, matching the per-record semantics of the real store.

use crate::db::{RallySource, StoreError, WaypointStore};
use crate::models::{BonusPoint, Combination, Rally, Waypoint};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory database. Clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryDb {
    rallies: Arc<DashMap<String, Rally>>,
    bonus_points: Arc<DashMap<String, BonusPoint>>,
    combinations: Arc<DashMap<String, Combination>>,
    /// Waypoints keyed by id, tagged with their insertion sequence
    waypoints: Arc<DashMap<String, (u64, Waypoint)>>,
    next_waypoint_seq: Arc<AtomicU64>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RallySource for MemoryDb {
    async fn get_rally(&self, rally_id: &str) -> Result<Option<Rally>, StoreError> {
        Ok(self.rallies.get(rally_id).map(|r| r.value().clone()))
    }

    async fn insert_rally(&self, rally: &Rally) -> Result<(), StoreError> {
        self.rallies.insert(rally.id.clone(), rally.clone());
        Ok(())
    }

    async fn list_bonus_points(&self, rally_id: &str) -> Result<Vec<BonusPoint>, StoreError> {
        let mut points: Vec<BonusPoint> = self
            .bonus_points
            .iter()
            .filter(|e| e.value().rally_id == rally_id)
            .map(|e| e.value().clone())
            .collect();
        points.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(points)
    }

    async fn insert_bonus_point(&self, bonus_point: &BonusPoint) -> Result<(), StoreError> {
        self.bonus_points
            .insert(bonus_point.id.clone(), bonus_point.clone());
        Ok(())
    }

    async fn list_combinations(&self, rally_id: &str) -> Result<Vec<Combination>, StoreError> {
        let mut combos: Vec<Combination> = self
            .combinations
            .iter()
            .filter(|e| e.value().rally_id() == rally_id)
            .map(|e| e.value().clone())
            .collect();
        combos.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(combos)
    }

    async fn insert_combination(&self, combination: &Combination) -> Result<(), StoreError> {
        self.combinations
            .insert(combination.id().to_string(), combination.clone());
        Ok(())
    }
}

impl WaypointStore for MemoryDb {
    /// Waypoints of the leg in insertion order, so equal or missing
    /// sequence orders tie-break the same way on every call.
    async fn list_waypoints(&self, leg_id: &str) -> Result<Vec<Waypoint>, StoreError> {
        let mut tagged: Vec<(u64, Waypoint)> = self
            .waypoints
            .iter()
            .filter(|e| e.value().1.leg_id == leg_id)
            .map(|e| e.value().clone())
            .collect();
        tagged.sort_by_key(|(seq, _)| *seq);
        Ok(tagged.into_iter().map(|(_, w)| w).collect())
    }

    async fn insert_waypoint(&self, waypoint: &Waypoint) -> Result<(), StoreError> {
        // Rewriting an existing waypoint keeps its original position.
        self.waypoints
            .entry(waypoint.id.clone())
            .and_modify(|(_, w)| *w = waypoint.clone())
            .or_insert_with(|| {
                let seq = self.next_waypoint_seq.fetch_add(1, Ordering::Relaxed);
                (seq, waypoint.clone())
            });
        Ok(())
    }

    async fn update_waypoint_sequence_order(
        &self,
        waypoint_id: &str,
        order: u32,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .waypoints
            .get_mut(waypoint_id)
            .ok_or_else(|| StoreError::NotFound(format!("waypoint {waypoint_id}")))?;
        entry.1.sequence_order = Some(order);
        Ok(())
    }

    async fn delete_waypoint(&self, waypoint_id: &str) -> Result<(), StoreError> {
        self.waypoints
            .remove(waypoint_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("waypoint {waypoint_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, leg: &str, order: u32) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            leg_id: leg.to_string(),
            name: id.to_string(),
            sequence_order: Some(order),
            location: None,
            bonus_point_id: None,
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_waypoints_scoped_to_leg() {
        let db = MemoryDb::new();
        db.insert_waypoint(&wp("a", "leg-1", 1)).await.unwrap();
        db.insert_waypoint(&wp("b", "leg-2", 1)).await.unwrap();

        let leg1 = db.list_waypoints("leg-1").await.unwrap();
        assert_eq!(leg1.len(), 1);
        assert_eq!(leg1[0].id, "a");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_waypoint() {
        let db = MemoryDb::new();
        assert!(matches!(
            db.update_waypoint_sequence_order("nope", 1).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            db.delete_waypoint("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_waypoints_in_insertion_order() {
        let db = MemoryDb::new();
        let ids = ["m", "c", "x", "a", "q", "b", "z", "k"];
        for id in ids {
            db.insert_waypoint(&wp(id, "leg-1", 1)).await.unwrap();
        }
        // Rewriting keeps the original position.
        db.insert_waypoint(&wp("m", "leg-1", 2)).await.unwrap();

        for _ in 0..3 {
            let listed: Vec<String> = db
                .list_waypoints("leg-1")
                .await
                .unwrap()
                .into_iter()
                .map(|w| w.id)
                .collect();
            assert_eq!(listed, ids);
        }
    }

    #[tokio::test]
    async fn test_update_sequence_order() {
        let db = MemoryDb::new();
        db.insert_waypoint(&wp("a", "leg-1", 1)).await.unwrap();
        db.update_waypoint_sequence_order("a", 4).await.unwrap();
        assert_eq!(
            db.list_waypoints("leg-1").await.unwrap()[0].sequence_order,
            Some(4)
        );
    }
}
