// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bonus point model and validation.

use crate::models::Coordinate;
use crate::services::geomath;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError, ValidationErrors};

/// What a rider must submit to claim a bonus point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum VerificationRequirement {
    Photo,
    Receipt,
    Code,
    Question,
    GpsOnly,
    Selfie,
    Combined,
}

/// Informational tag; scoring never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BonusCategory {
    Landmark,
    Scenic,
    Historical,
    Restaurant,
    Fuel,
    Lodging,
    Business,
    #[default]
    Other,
}

/// A scorable, geolocated target within a rally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_verification"))]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BonusPoint {
    /// Opaque identifier, unique within the rally
    pub id: String,
    /// Owning rally
    #[validate(custom(function = "not_blank"))]
    pub rally_id: String,
    /// Display name
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Short human-referenceable code (e.g. "BP12")
    #[validate(custom(function = "not_blank"), length(max = 6))]
    pub code: String,
    #[validate(custom(function = "valid_coordinate"))]
    pub coordinate: Coordinate,
    #[validate(range(min = 1))]
    pub points: u32,
    #[serde(default)]
    pub category: BonusCategory,
    pub verification: VerificationRequirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BonusPoint {
    /// True iff every field invariant holds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Run validation and flatten failures into readable messages.
    pub fn violations(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => describe_errors(&errors),
        }
    }

    /// Distance in meters to another bonus point.
    pub fn distance_to(&self, other: &BonusPoint) -> f64 {
        geomath::distance(self.coordinate, other.coordinate)
    }

    /// Distance in meters to an arbitrary latitude/longitude.
    pub fn distance_to_coords(&self, latitude: f64, longitude: f64) -> f64 {
        geomath::distance(
            self.coordinate,
            Coordinate {
                latitude,
                longitude,
            },
        )
    }
}

/// Return the short codes used by more than one point (case-insensitive).
pub fn duplicate_codes<'a>(points: impl IntoIterator<Item = &'a BonusPoint>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for point in points {
        let key = point.code.trim().to_ascii_uppercase();
        if !seen.insert(key.clone()) && !duplicates.contains(&key) {
            duplicates.push(key);
        }
    }
    duplicates
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

fn valid_coordinate(value: &Coordinate) -> Result<(), ValidationError> {
    if !value.is_valid() {
        return Err(ValidationError::new("coordinate_range")
            .with_message("latitude/longitude out of range".into()));
    }
    Ok(())
}

/// Verification fields must match the requirement.
///
/// `Combined` accepts either a code or a full question/answer pair.
fn validate_verification(bp: &BonusPoint) -> Result<(), ValidationError> {
    let has_code = !is_blank(bp.verification_code.as_deref());
    let has_question = !is_blank(bp.question.as_deref()) && !is_blank(bp.answer.as_deref());

    let ok = match bp.verification {
        VerificationRequirement::Code => has_code,
        VerificationRequirement::Question => has_question,
        VerificationRequirement::Combined => has_code || has_question,
        VerificationRequirement::Photo
        | VerificationRequirement::Receipt
        | VerificationRequirement::GpsOnly
        | VerificationRequirement::Selfie => true,
    };

    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("verification")
            .with_message("verification details missing for requirement".into()))
    }
}

fn describe_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut out: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    out.sort();
    out
}
