// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! The core only sees two narrow contracts: [`RallySource`] for rally
//! content and [`WaypointStore`] for per-record waypoint mutations. Both
//! are implemented by the in-memory store (local development and tests)
//! and by Firestore; [`RallyDb`] picks one at startup.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::models::{BonusPoint, Combination, Rally, Waypoint};
use std::future::Future;

/// Collection names as constants.
pub mod collections {
    pub const RALLIES: &str = "rallies";
    pub const BONUS_POINTS: &str = "bonus_points";
    pub const COMBINATIONS: &str = "combinations";
    pub const WAYPOINTS: &str = "waypoints";
}

/// Store-level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("store error: {0}")]
    Backend(String),
}

/// Read/write access to rally content.
pub trait RallySource: Send + Sync {
    fn get_rally(
        &self,
        rally_id: &str,
    ) -> impl Future<Output = Result<Option<Rally>, StoreError>> + Send;

    fn insert_rally(&self, rally: &Rally) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_bonus_points(
        &self,
        rally_id: &str,
    ) -> impl Future<Output = Result<Vec<BonusPoint>, StoreError>> + Send;

    fn insert_bonus_point(
        &self,
        bonus_point: &BonusPoint,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_combinations(
        &self,
        rally_id: &str,
    ) -> impl Future<Output = Result<Vec<Combination>, StoreError>> + Send;

    fn insert_combination(
        &self,
        combination: &Combination,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Remote waypoint store. Every call is independent; there is no batch or
/// transactional variant.
pub trait WaypointStore: Send + Sync {
    fn list_waypoints(
        &self,
        leg_id: &str,
    ) -> impl Future<Output = Result<Vec<Waypoint>, StoreError>> + Send;

    fn insert_waypoint(
        &self,
        waypoint: &Waypoint,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn update_waypoint_sequence_order(
        &self,
        waypoint_id: &str,
        order: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_waypoint(&self, waypoint_id: &str)
        -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Store backend selected at startup.
#[derive(Clone)]
pub enum RallyDb {
    Memory(MemoryDb),
    Firestore(FirestoreDb),
}

impl RallySource for RallyDb {
    async fn get_rally(&self, rally_id: &str) -> Result<Option<Rally>, StoreError> {
        match self {
            RallyDb::Memory(db) => db.get_rally(rally_id).await,
            RallyDb::Firestore(db) => db.get_rally(rally_id).await,
        }
    }

    async fn insert_rally(&self, rally: &Rally) -> Result<(), StoreError> {
        match self {
            RallyDb::Memory(db) => db.insert_rally(rally).await,
            RallyDb::Firestore(db) => db.insert_rally(rally).await,
        }
    }

    async fn list_bonus_points(&self, rally_id: &str) -> Result<Vec<BonusPoint>, StoreError> {
        match self {
            RallyDb::Memory(db) => db.list_bonus_points(rally_id).await,
            RallyDb::Firestore(db) => db.list_bonus_points(rally_id).await,
        }
    }

    async fn insert_bonus_point(&self, bonus_point: &BonusPoint) -> Result<(), StoreError> {
        match self {
            RallyDb::Memory(db) => db.insert_bonus_point(bonus_point).await,
            RallyDb::Firestore(db) => db.insert_bonus_point(bonus_point).await,
        }
    }

    async fn list_combinations(&self, rally_id: &str) -> Result<Vec<Combination>, StoreError> {
        match self {
            RallyDb::Memory(db) => db.list_combinations(rally_id).await,
            RallyDb::Firestore(db) => db.list_combinations(rally_id).await,
        }
    }

    async fn insert_combination(&self, combination: &Combination) -> Result<(), StoreError> {
        match self {
            RallyDb::Memory(db) => db.insert_combination(combination).await,
            RallyDb::Firestore(db) => db.insert_combination(combination).await,
        }
    }
}

impl WaypointStore for RallyDb {
    async fn list_waypoints(&self, leg_id: &str) -> Result<Vec<Waypoint>, StoreError> {
        match self {
            RallyDb::Memory(db) => db.list_waypoints(leg_id).await,
            RallyDb::Firestore(db) => db.list_waypoints(leg_id).await,
        }
    }

    async fn insert_waypoint(&self, waypoint: &Waypoint) -> Result<(), StoreError> {
        match self {
            RallyDb::Memory(db) => db.insert_waypoint(waypoint).await,
            RallyDb::Firestore(db) => db.insert_waypoint(waypoint).await,
        }
    }

    async fn update_waypoint_sequence_order(
        &self,
        waypoint_id: &str,
        order: u32,
    ) -> Result<(), StoreError> {
        match self {
            RallyDb::Memory(db) => db.update_waypoint_sequence_order(waypoint_id, order).await,
            RallyDb::Firestore(db) => db.update_waypoint_sequence_order(waypoint_id, order).await,
        }
    }

    async fn delete_waypoint(&self, waypoint_id: &str) -> Result<(), StoreError> {
        match self {
            RallyDb::Memory(db) => db.delete_waypoint(waypoint_id).await,
            RallyDb::Firestore(db) => db.delete_waypoint(waypoint_id).await,
        }
    }
}
