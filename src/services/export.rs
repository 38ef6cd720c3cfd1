// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON export of a rally's bonus points for map clients.

use crate::models::BonusPoint;
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

/// Build a FeatureCollection with one Point feature per bonus point.
///
/// Verification secrets (codes, answers) are never exported.
pub fn bonus_points_to_geojson(points: &[BonusPoint]) -> FeatureCollection {
    let features = points
        .iter()
        .map(|bp| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), json!(bp.name));
            properties.insert("code".to_string(), json!(bp.code));
            properties.insert("points".to_string(), json!(bp.points));
            properties.insert("category".to_string(), json!(bp.category));
            properties.insert("verification".to_string(), json!(bp.verification));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    bp.coordinate.longitude,
                    bp.coordinate.latitude,
                ]))),
                id: Some(Id::String(bp.id.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
