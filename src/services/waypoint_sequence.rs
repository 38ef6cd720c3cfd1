// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waypoint reordering and deletion against a remote store.
//!
//! The store only offers single-record updates, so every operation here is
//! a short plan of independent calls issued one after another:
//! 1. Sort the cached list by sequence order (missing orders last)
//! 2. Compute the minimal plan of remote calls
//! 3. Issue the calls in order, applying each to the local copy only once
//!    the store has confirmed it
//! 4. Stop at the first failure
//!
//! There is no enclosing transaction. A failure after some confirmed calls
//! leaves the store partially updated; [`SequenceError`] reports which calls
//! went through and the local state matching them, and the caller decides
//! whether to re-fetch the leg. Dropping an operation's future midway has
//! the same effect: issued calls stay applied, later calls are never sent.

use crate::db::{StoreError, WaypointStore};
use crate::models::waypoint::sort_by_sequence;
use crate::models::Waypoint;
use std::fmt;

/// A single call against the remote waypoint store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    SetSequenceOrder { waypoint_id: String, order: u32 },
    Delete { waypoint_id: String },
}

impl fmt::Display for RemoteCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteCall::SetSequenceOrder { waypoint_id, order } => {
                write!(f, "set {waypoint_id} order to {order}")
            }
            RemoteCall::Delete { waypoint_id } => write!(f, "delete {waypoint_id}"),
        }
    }
}

/// Which user gesture an operation was serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOperation {
    MoveUp,
    MoveDown,
    DeleteAndRenumber,
}

impl fmt::Display for SequenceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SequenceOperation::MoveUp => "move up",
            SequenceOperation::MoveDown => "move down",
            SequenceOperation::DeleteAndRenumber => "delete and renumber",
        })
    }
}

/// A remote call failed partway through an operation.
#[derive(Debug, thiserror::Error)]
#[error(
    "{operation} failed at step {step} ({failed_call}) after {} confirmed call(s): {source}",
    .confirmed.len()
)]
pub struct SequenceError {
    pub operation: SequenceOperation,
    /// 1-based index of the failed call within the plan
    pub step: usize,
    pub failed_call: RemoteCall,
    /// Calls the store confirmed before the failure
    pub confirmed: Vec<RemoteCall>,
    /// Local list with only the confirmed calls applied, sorted
    pub local_state: Vec<Waypoint>,
    pub source: StoreError,
}

impl SequenceError {
    /// True when the store was changed before the failure, meaning the
    /// cached list no longer matches what was loaded.
    pub fn is_partial(&self) -> bool {
        !self.confirmed.is_empty()
    }
}

/// Plan for swapping `sorted[target]` with its neighbor `sorted[neighbor]`.
///
/// When both have distinct stored orders the two values are exchanged.
/// Otherwise (a missing or duplicated order) stored values cannot express
/// the move, so each takes the other's 1-based rank instead. The neighbor
/// is written first, then the target.
fn plan_swap(sorted: &[Waypoint], target: usize, neighbor: usize) -> Vec<RemoteCall> {
    let (target_order, neighbor_order) =
        match (sorted[target].sequence_order, sorted[neighbor].sequence_order) {
            (Some(t), Some(n)) if t != n => (t, n),
            _ => (target as u32 + 1, neighbor as u32 + 1),
        };
    vec![
        RemoteCall::SetSequenceOrder {
            waypoint_id: sorted[neighbor].id.clone(),
            order: target_order,
        },
        RemoteCall::SetSequenceOrder {
            waypoint_id: sorted[target].id.clone(),
            order: neighbor_order,
        },
    ]
}

/// Plan for deleting `sorted[target]` and closing the gap.
///
/// Only waypoints whose stored order differs from their new rank are
/// rewritten.
fn plan_delete(sorted: &[Waypoint], target: usize) -> Vec<RemoteCall> {
    let mut plan = vec![RemoteCall::Delete {
        waypoint_id: sorted[target].id.clone(),
    }];
    plan.extend(
        sorted
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .map(|(_, w)| w)
            .enumerate()
            .filter_map(|(rank, w)| {
                let order = rank as u32 + 1;
                (w.sequence_order != Some(order)).then(|| RemoteCall::SetSequenceOrder {
                    waypoint_id: w.id.clone(),
                    order,
                })
            }),
    );
    plan
}

fn apply(local: &mut Vec<Waypoint>, call: &RemoteCall) {
    match call {
        RemoteCall::SetSequenceOrder { waypoint_id, order } => {
            if let Some(w) = local.iter_mut().find(|w| w.id == *waypoint_id) {
                w.sequence_order = Some(*order);
            }
        }
        RemoteCall::Delete { waypoint_id } => local.retain(|w| w.id != *waypoint_id),
    }
}

/// Keeps a leg's waypoint orders contiguous through single-record updates.
pub struct WaypointSequenceManager<'a, S> {
    store: &'a S,
}

impl<'a, S: WaypointStore> WaypointSequenceManager<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Swap `target` with its predecessor.
    ///
    /// Returns the sorted list unchanged, with no remote calls, when the
    /// target is already first or not in the list.
    pub async fn move_up(
        &self,
        waypoints: Vec<Waypoint>,
        target_id: &str,
    ) -> Result<Vec<Waypoint>, SequenceError> {
        let mut sorted = waypoints;
        sort_by_sequence(&mut sorted);

        let plan = match sorted.iter().position(|w| w.id == target_id) {
            Some(i) if i > 0 => plan_swap(&sorted, i, i - 1),
            _ => {
                tracing::debug!(waypoint_id = target_id, "Move up is a no-op");
                return Ok(sorted);
            }
        };
        self.execute(SequenceOperation::MoveUp, plan, sorted).await
    }

    /// Swap `target` with its successor.
    ///
    /// No-op when the target is already last or not in the list.
    pub async fn move_down(
        &self,
        waypoints: Vec<Waypoint>,
        target_id: &str,
    ) -> Result<Vec<Waypoint>, SequenceError> {
        let mut sorted = waypoints;
        sort_by_sequence(&mut sorted);

        let plan = match sorted.iter().position(|w| w.id == target_id) {
            Some(i) if i + 1 < sorted.len() => plan_swap(&sorted, i, i + 1),
            _ => {
                tracing::debug!(waypoint_id = target_id, "Move down is a no-op");
                return Ok(sorted);
            }
        };
        self.execute(SequenceOperation::MoveDown, plan, sorted).await
    }

    /// Delete `target` and renumber the rest to 1..N.
    ///
    /// No-op when the target is not in the list.
    pub async fn delete_and_renumber(
        &self,
        waypoints: Vec<Waypoint>,
        target_id: &str,
    ) -> Result<Vec<Waypoint>, SequenceError> {
        let mut sorted = waypoints;
        sort_by_sequence(&mut sorted);

        let Some(target) = sorted.iter().position(|w| w.id == target_id) else {
            tracing::debug!(waypoint_id = target_id, "Delete target not in leg");
            return Ok(sorted);
        };
        let plan = plan_delete(&sorted, target);
        self.execute(SequenceOperation::DeleteAndRenumber, plan, sorted)
            .await
    }

    /// Issue `plan` in order, applying each confirmed call to `local`.
    async fn execute(
        &self,
        operation: SequenceOperation,
        plan: Vec<RemoteCall>,
        mut local: Vec<Waypoint>,
    ) -> Result<Vec<Waypoint>, SequenceError> {
        tracing::info!(%operation, calls = plan.len(), "Applying waypoint sequence plan");

        let mut confirmed = Vec::with_capacity(plan.len());
        for (index, call) in plan.into_iter().enumerate() {
            let result = match &call {
                RemoteCall::SetSequenceOrder { waypoint_id, order } => {
                    self.store
                        .update_waypoint_sequence_order(waypoint_id, *order)
                        .await
                }
                RemoteCall::Delete { waypoint_id } => self.store.delete_waypoint(waypoint_id).await,
            };

            match result {
                Ok(()) => {
                    tracing::debug!(%operation, step = index + 1, %call, "Remote call confirmed");
                    apply(&mut local, &call);
                    confirmed.push(call);
                }
                Err(source) => {
                    tracing::warn!(
                        %operation,
                        step = index + 1,
                        %call,
                        confirmed = confirmed.len(),
                        error = %source,
                        "Remote call failed, aborting"
                    );
                    sort_by_sequence(&mut local);
                    return Err(SequenceError {
                        operation,
                        step: index + 1,
                        failed_call: call,
                        confirmed,
                        local_state: local,
                        source,
                    });
                }
            }
        }

        sort_by_sequence(&mut local);
        Ok(local)
    }
}
