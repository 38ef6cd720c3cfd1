// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Rallies
//! - Bonus points and combinations (queried by rally)
//! - Waypoints (queried by leg, updated one record at a time)

use crate::db::{collections, RallySource, StoreError, WaypointStore};
use crate::models::{BonusPoint, Combination, Rally, Waypoint};
use firestore::paths;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation returns an error.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Backend("Database not connected (offline mode)".to_string()))
    }
}

impl RallySource for FirestoreDb {
    async fn get_rally(&self, rally_id: &str) -> Result<Option<Rally>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RALLIES)
            .obj()
            .one(rally_id)
            .await
            .map_err(backend)
    }

    async fn insert_rally(&self, rally: &Rally) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RALLIES)
            .document_id(&rally.id)
            .object(rally)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list_bonus_points(&self, rally_id: &str) -> Result<Vec<BonusPoint>, StoreError> {
        let points: Vec<BonusPoint> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BONUS_POINTS)
            .filter(|q| q.for_all([q.field("rally_id").eq(rally_id)]))
            .order_by([("code", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(backend)?;

        tracing::debug!(rally_id, count = points.len(), "Loaded bonus points");
        Ok(points)
    }

    async fn insert_bonus_point(&self, bonus_point: &BonusPoint) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BONUS_POINTS)
            .document_id(&bonus_point.id)
            .object(bonus_point)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list_combinations(&self, rally_id: &str) -> Result<Vec<Combination>, StoreError> {
        // Documents failing the combination invariants fail deserialization
        // and surface here as a backend error.
        let combos: Vec<Combination> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::COMBINATIONS)
            .filter(|q| q.for_all([q.field("rally_id").eq(rally_id)]))
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(backend)?;

        tracing::debug!(rally_id, count = combos.len(), "Loaded combinations");
        Ok(combos)
    }

    async fn insert_combination(&self, combination: &Combination) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COMBINATIONS)
            .document_id(combination.id())
            .object(combination)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }
}

impl WaypointStore for FirestoreDb {
    /// Waypoints of the leg in creation order, so equal or missing
    /// sequence orders tie-break the same way on every call.
    async fn list_waypoints(&self, leg_id: &str) -> Result<Vec<Waypoint>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WAYPOINTS)
            .filter(|q| q.for_all([q.field("leg_id").eq(leg_id)]))
            .order_by([
                ("created_at", firestore::FirestoreQueryDirection::Ascending),
                ("id", firestore::FirestoreQueryDirection::Ascending),
            ])
            .obj()
            .query()
            .await
            .map_err(backend)
    }

    async fn insert_waypoint(&self, waypoint: &Waypoint) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WAYPOINTS)
            .document_id(&waypoint.id)
            .object(waypoint)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    /// Rewrite only the `sequence_order` field; other fields are left to
    /// whoever wrote them last.
    async fn update_waypoint_sequence_order(
        &self,
        waypoint_id: &str,
        order: u32,
    ) -> Result<(), StoreError> {
        let client = self.get_client()?;

        let mut waypoint: Waypoint = client
            .fluent()
            .select()
            .by_id_in(collections::WAYPOINTS)
            .obj()
            .one(waypoint_id)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::NotFound(format!("waypoint {waypoint_id}")))?;
        waypoint.sequence_order = Some(order);

        let _: () = client
            .fluent()
            .update()
            .fields(paths!(Waypoint::{sequence_order}))
            .in_col(collections::WAYPOINTS)
            .document_id(waypoint_id)
            .object(&waypoint)
            .execute()
            .await
            .map_err(backend)?;

        tracing::debug!(waypoint_id, order, "Updated waypoint sequence order");
        Ok(())
    }

    async fn delete_waypoint(&self, waypoint_id: &str) -> Result<(), StoreError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::WAYPOINTS)
            .document_id(waypoint_id)
            .execute()
            .await
            .map_err(backend)?;

        tracing::debug!(waypoint_id, "Deleted waypoint");
        Ok(())
    }
}
