// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Combination model: a scored group of bonus points with a joint rule.
//!
//! A [`Combination`] can only be obtained through [`Combination::new`]
//! (or deserialization, which goes through the same checks), so every
//! value that reaches the scorer satisfies the structural invariants.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Smallest number of members a combination may have.
pub const MIN_MEMBERS: usize = 2;

/// How many members must be visited for the combination to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum CompletionRule {
    /// Every member must be visited.
    AllRequired,
    /// At least `count` distinct members must be visited.
    MinimumCount { count: u32 },
}

impl CompletionRule {
    /// Build a rule from the flag-plus-optional-minimum shape used by older
    /// clients.
    ///
    /// With `all_required`, a declared minimum must equal `member_count`.
    /// Otherwise the minimum is mandatory and must lie in [2, member_count].
    pub fn from_flags(
        all_required: bool,
        minimum: Option<u32>,
        member_count: usize,
    ) -> Result<Self, CombinationError> {
        if all_required {
            return match minimum {
                Some(n) if n as usize != member_count => {
                    Err(CombinationError::MinimumMismatch {
                        minimum: n,
                        members: member_count,
                    })
                }
                _ => Ok(CompletionRule::AllRequired),
            };
        }

        let count = minimum.ok_or(CombinationError::MissingMinimum)?;
        let rule = CompletionRule::MinimumCount { count };
        rule.check(member_count)?;
        Ok(rule)
    }

    /// Number of distinct members that must be visited.
    pub fn required_count(&self, member_count: usize) -> usize {
        match self {
            CompletionRule::AllRequired => member_count,
            CompletionRule::MinimumCount { count } => *count as usize,
        }
    }

    fn check(&self, member_count: usize) -> Result<(), CombinationError> {
        if let CompletionRule::MinimumCount { count } = *self {
            if (count as usize) < MIN_MEMBERS || count as usize > member_count {
                return Err(CombinationError::MinimumOutOfRange {
                    minimum: count,
                    members: member_count,
                });
            }
        }
        Ok(())
    }
}

/// Unvalidated combination input as submitted by an organizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CombinationDraft {
    pub id: String,
    pub rally_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub points: u32,
    /// Member bonus point ids
    pub members: Vec<String>,
    pub rule: CompletionRule,
    /// Required visit order; `None` means order does not matter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<String>>,
}

/// A validated combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CombinationDraft", into = "CombinationDraft")]
pub struct Combination {
    id: String,
    rally_id: String,
    name: String,
    description: Option<String>,
    points: u32,
    members: Vec<String>,
    rule: CompletionRule,
    sequence: Option<Vec<String>>,
}

impl Combination {
    /// Validate a draft and produce an evaluable combination.
    pub fn new(draft: CombinationDraft) -> Result<Self, CombinationError> {
        if draft.rally_id.trim().is_empty() {
            return Err(CombinationError::Blank("rally_id"));
        }
        if draft.name.trim().is_empty() {
            return Err(CombinationError::Blank("name"));
        }
        if draft.points == 0 {
            return Err(CombinationError::ZeroPoints);
        }
        if draft.members.len() < MIN_MEMBERS {
            return Err(CombinationError::TooFewMembers(draft.members.len()));
        }

        let member_set: HashSet<&str> = draft.members.iter().map(String::as_str).collect();
        if member_set.len() != draft.members.len() {
            return Err(CombinationError::DuplicateMember);
        }

        draft.rule.check(draft.members.len())?;

        if let Some(sequence) = &draft.sequence {
            let sequence_set: HashSet<&str> = sequence.iter().map(String::as_str).collect();
            if sequence.len() != draft.members.len() || sequence_set != member_set {
                return Err(CombinationError::SequenceMismatch);
            }
        }

        Ok(Self {
            id: draft.id,
            rally_id: draft.rally_id,
            name: draft.name,
            description: draft.description,
            points: draft.points,
            members: draft.members,
            rule: draft.rule,
            sequence: draft.sequence,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rally_id(&self) -> &str {
        &self.rally_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Points awarded when the combination is completed.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Member bonus point ids, in declaration order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn rule(&self) -> CompletionRule {
        self.rule
    }

    /// Required visit order, if the combination enforces one.
    pub fn sequence(&self) -> Option<&[String]> {
        self.sequence.as_deref()
    }

    pub fn sequence_required(&self) -> bool {
        self.sequence.is_some()
    }

    /// Distinct members a rider must visit.
    pub fn required_count(&self) -> usize {
        self.rule.required_count(self.members.len())
    }
}

impl TryFrom<CombinationDraft> for Combination {
    type Error = CombinationError;

    fn try_from(draft: CombinationDraft) -> Result<Self, Self::Error> {
        Combination::new(draft)
    }
}

impl From<Combination> for CombinationDraft {
    fn from(c: Combination) -> Self {
        CombinationDraft {
            id: c.id,
            rally_id: c.rally_id,
            name: c.name,
            description: c.description,
            points: c.points,
            members: c.members,
            rule: c.rule,
            sequence: c.sequence,
        }
    }
}

/// Reasons a draft is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombinationError {
    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("points must be greater than zero")]
    ZeroPoints,

    #[error("a combination needs at least 2 members, got {0}")]
    TooFewMembers(usize),

    #[error("member ids must be distinct")]
    DuplicateMember,

    #[error("minimum count is required unless all members are required")]
    MissingMinimum,

    #[error("minimum count {minimum} must equal member count {members} when all are required")]
    MinimumMismatch { minimum: u32, members: usize },

    #[error("minimum count {minimum} outside [2, {members}]")]
    MinimumOutOfRange { minimum: u32, members: usize },

    #[error("sequence must contain exactly the member ids")]
    SequenceMismatch,
}
