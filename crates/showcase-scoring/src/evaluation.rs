//! Per (judge, product) evaluation workflow.
//!
//! The workflow is a small state machine. Every write goes through
//! [`EvaluationState::transition`], which looks the request up in
//! [`TRANSITION_TABLE`] and applies the completion guard:
//!
//! | rule             | requested     | notes     | stored        |
//! |------------------|---------------|-----------|---------------|
//! | `ForceComplete`  | `completed`   | any       | `completed`   |
//! | `NotesStartWork` | `pending`     | non-empty | `in_progress` |
//! | `StayPending`    | `pending`     | empty     | `pending`     |
//! | `Progress`       | `in_progress` | any       | `in_progress` |
//!
//! A completed evaluation only leaves `completed` through [`EvaluationState::reopen`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScoringError;

/// Workflow state of one judge's evaluation of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "evaluation_state", rename_all = "snake_case")
)]
pub enum EvaluationState {
    Pending,
    InProgress,
    Completed,
}

/// How urgent an evaluation is for the judge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "evaluation_priority", rename_all = "lowercase")
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Named rule that produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRule {
    /// Completing always wins.
    ForceComplete,
    /// Saving notes on a pending evaluation starts the work.
    NotesStartWork,
    /// Pending with nothing written stays pending.
    StayPending,
    /// Explicit move to in-progress.
    Progress,
    /// Admin re-opened a completed evaluation.
    Reopen,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionEntry {
    pub rule: TransitionRule,
    pub requested: EvaluationState,
    /// `Some(true)` requires notes, `Some(false)` requires none, `None` matches both.
    pub with_notes: Option<bool>,
    pub stores: EvaluationState,
}

/// Transition table consulted by [`EvaluationState::transition`], first match wins.
pub const TRANSITION_TABLE: [TransitionEntry; 4] = [
    TransitionEntry {
        rule: TransitionRule::ForceComplete,
        requested: EvaluationState::Completed,
        with_notes: None,
        stores: EvaluationState::Completed,
    },
    TransitionEntry {
        rule: TransitionRule::NotesStartWork,
        requested: EvaluationState::Pending,
        with_notes: Some(true),
        stores: EvaluationState::InProgress,
    },
    TransitionEntry {
        rule: TransitionRule::StayPending,
        requested: EvaluationState::Pending,
        with_notes: Some(false),
        stores: EvaluationState::Pending,
    },
    TransitionEntry {
        rule: TransitionRule::Progress,
        requested: EvaluationState::InProgress,
        with_notes: None,
        stores: EvaluationState::InProgress,
    },
];

/// Outcome of a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// State before the write; `None` when no row existed.
    pub from: Option<EvaluationState>,
    pub to: EvaluationState,
    pub rule: TransitionRule,
}

impl EvaluationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Resolves the state to store for a `setStatus` request.
    ///
    /// `current` is `None` when the judge never touched the evaluation, which
    /// is treated as `pending`.
    pub fn transition(
        current: Option<Self>,
        requested: Self,
        notes: Option<&str>,
    ) -> Result<Transition, ScoringError> {
        let has_notes = notes.is_some_and(|n| !n.trim().is_empty());

        let entry = TRANSITION_TABLE
            .iter()
            .find(|entry| {
                entry.requested == requested
                    && entry.with_notes.map_or(true, |needs| needs == has_notes)
            })
            .ok_or(ScoringError::InvalidTransition {
                from: current.unwrap_or(Self::Pending),
                to: requested,
            })?;

        if current == Some(Self::Completed) && entry.stores != Self::Completed {
            return Err(ScoringError::InvalidTransition {
                from: Self::Completed,
                to: entry.stores,
            });
        }

        Ok(Transition {
            from: current,
            to: entry.stores,
            rule: entry.rule,
        })
    }

    /// Moves a completed evaluation back to `in_progress`.
    pub fn reopen(current: Option<Self>) -> Result<Transition, ScoringError> {
        match current {
            Some(Self::Completed) => Ok(Transition {
                from: current,
                to: Self::InProgress,
                rule: TransitionRule::Reopen,
            }),
            other => Err(ScoringError::InvalidTransition {
                from: other.unwrap_or(Self::Pending),
                to: Self::InProgress,
            }),
        }
    }
}

impl fmt::Display for EvaluationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored workflow row for one (judge, product) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EvaluationStatus {
    pub id: Uuid,
    pub judge_id: Uuid,
    pub product_id: Uuid,
    pub status: EvaluationState,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
