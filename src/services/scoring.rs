// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Combination evaluation and rider run scoring.
//!
//! Everything here is a pure function of a combination definition and a
//! rider's visited bonus point ids, in visit order. Nothing is cached on
//! the combination: visit state belongs to a run, not to the definition.
//!
//! Member ids that no longer resolve to a bonus point are simply never
//! visited, so they count toward neither completion nor percentage.

use crate::models::{BonusPoint, Combination};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of distinct members of `combo` present in `visited`.
fn visited_member_count(combo: &Combination, visited: &HashSet<&str>) -> usize {
    combo
        .members()
        .iter()
        .filter(|m| visited.contains(m.as_str()))
        .count()
}

fn visited_set(visited: &[String]) -> HashSet<&str> {
    visited.iter().map(String::as_str).collect()
}

/// Whether `required` occurs in `visited` as a subsequence.
///
/// Unrelated visits in between are fine; visiting required members out of
/// relative order is not.
fn follows_sequence(required: &[String], visited: &[String]) -> bool {
    let mut next = 0;
    for id in visited {
        if next == required.len() {
            break;
        }
        if *id == required[next] {
            next += 1;
        }
    }
    next == required.len()
}

/// Whether the visits satisfy the combination's rule and, if set, its
/// required sequence.
///
/// With a minimum-count rule only the first `count` elements of the
/// declared sequence must be matched in order.
pub fn is_completed_by(combo: &Combination, visited: &[String]) -> bool {
    let required = combo.required_count();
    let has_enough = visited_member_count(combo, &visited_set(visited)) >= required;

    match combo.sequence() {
        Some(sequence) if has_enough => follows_sequence(&sequence[..required], visited),
        _ => has_enough,
    }
}

/// Raw coverage in [0, 100], ignoring any sequence constraint.
pub fn completion_percentage(combo: &Combination, visited: &[String]) -> u32 {
    let required = combo.required_count();
    let covered = visited_member_count(combo, &visited_set(visited));
    ((100 * covered) / required).min(100) as u32
}

/// All or nothing: the combination's points if completed, else zero.
pub fn points_awarded(combo: &Combination, visited: &[String]) -> u32 {
    if is_completed_by(combo, visited) {
        combo.points()
    } else {
        0
    }
}

/// Members not yet visited, in declaration order; empty once completed.
///
/// This is a hint. With a minimum-count rule it lists every unvisited
/// member even when only some of them are still needed.
pub fn remaining_required(combo: &Combination, visited: &[String]) -> Vec<String> {
    if is_completed_by(combo, visited) {
        return Vec::new();
    }
    let seen = visited_set(visited);
    combo
        .members()
        .iter()
        .filter(|m| !seen.contains(m.as_str()))
        .cloned()
        .collect()
}

/// Per-combination progress for one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CombinationProgress {
    pub combination_id: String,
    pub name: String,
    pub completed: bool,
    pub percentage: u32,
    pub points_awarded: u32,
    pub remaining: Vec<String>,
}

impl CombinationProgress {
    pub fn evaluate(combo: &Combination, visited: &[String]) -> Self {
        let completed = is_completed_by(combo, visited);
        Self {
            combination_id: combo.id().to_string(),
            name: combo.name().to_string(),
            completed,
            percentage: completion_percentage(combo, visited),
            points_awarded: if completed { combo.points() } else { 0 },
            remaining: if completed {
                Vec::new()
            } else {
                remaining_required(combo, visited)
            },
        }
    }
}

/// Score summary for a rider's run through a rally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunScore {
    /// Sum of values of distinct visited bonus points
    pub bonus_points: u32,
    /// Sum of awarded combination points
    pub combination_points: u32,
    pub total: u32,
    pub combinations: Vec<CombinationProgress>,
    /// Visited ids that match no bonus point of the rally
    pub unknown_visits: Vec<String>,
}

/// Score a run: each visited bonus point counts once, plus every completed
/// combination.
pub fn score_run(
    bonus_points: &[BonusPoint],
    combinations: &[Combination],
    visited: &[String],
) -> RunScore {
    let by_id: HashMap<&str, &BonusPoint> =
        bonus_points.iter().map(|bp| (bp.id.as_str(), bp)).collect();

    let mut counted = HashSet::new();
    let mut bonus_total = 0u32;
    let mut unknown_visits = Vec::new();
    // Visits that resolve to a bonus point, in visit order. Combinations are
    // judged on these only, so a deleted member can never be satisfied.
    let mut resolved = Vec::with_capacity(visited.len());
    for id in visited {
        match by_id.get(id.as_str()) {
            Some(bp) => {
                resolved.push(id.clone());
                if counted.insert(id.as_str()) {
                    bonus_total = bonus_total.saturating_add(bp.points);
                }
            }
            None => {
                if !unknown_visits.contains(id) {
                    unknown_visits.push(id.clone());
                }
            }
        }
    }

    let progress: Vec<CombinationProgress> = combinations
        .iter()
        .map(|c| CombinationProgress::evaluate(c, &resolved))
        .collect();
    let combination_total = progress
        .iter()
        .fold(0u32, |acc, p| acc.saturating_add(p.points_awarded));

    tracing::debug!(
        visits = visited.len(),
        bonus_total,
        combination_total,
        "Scored run"
    );

    RunScore {
        bonus_points: bonus_total,
        combination_points: combination_total,
        total: bonus_total.saturating_add(combination_total),
        combinations: progress,
        unknown_visits,
    }
}
