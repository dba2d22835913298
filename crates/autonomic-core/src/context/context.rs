//! Context: the live, mutable snapshot of one monitored subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::observation::{self, Observation, ObservationValue};
use crate::errors::{AutonomicError, AutonomicResult};

/// Lifecycle status of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    Active,
    Idle,
    Closed,
}

/// One observed change of a scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Flattened key path.
    pub key: String,
    pub from: ObservationValue,
    pub to: ObservationValue,
    pub at: DateTime<Utc>,
}

/// Observable state for one subject.
///
/// `id` and `subject_id` never change after creation. A closed context
/// rejects every further mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    id: String,
    subject_id: String,
    /// Merged observation state.
    pub state: Observation,
    /// Ordered scalar changes, oldest first, bounded by configuration.
    pub transitions: Vec<StateTransition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ContextStatus,
    /// Number of observations merged so far.
    pub observation_count: u64,
}

impl Context {
    /// Create an empty, active context for a subject.
    pub fn new(subject_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            state: Observation::new(),
            transitions: Vec::new(),
            created_at: at,
            updated_at: at,
            status: ContextStatus::Active,
            observation_count: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn is_closed(&self) -> bool {
        self.status == ContextStatus::Closed
    }

    /// Check whether an observation could be merged without changing anything.
    pub fn check_observation(&self, incoming: &Observation, strict_types: bool) -> AutonomicResult<()> {
        if self.is_closed() {
            return Err(AutonomicError::invalid_observation(
                &self.subject_id,
                "context is closed",
            ));
        }
        observation::check_well_formed(incoming)
            .map_err(|reason| AutonomicError::invalid_observation(&self.subject_id, reason))?;
        if strict_types {
            observation::check_kinds_compatible(&self.state, incoming)
                .map_err(|reason| AutonomicError::invalid_observation(&self.subject_id, reason))?;
        }
        Ok(())
    }

    /// Merge an observation. On error the context is left unchanged.
    pub fn apply(
        &mut self,
        incoming: Observation,
        at: DateTime<Utc>,
        strict_types: bool,
        max_transitions: usize,
    ) -> AutonomicResult<()> {
        self.check_observation(&incoming, strict_types)?;

        let before = observation::flatten(&self.state);
        let changed = observation::flatten(&incoming);
        for (key, to) in changed {
            if let Some(from) = before.get(&key) {
                if *from != to {
                    self.transitions.push(StateTransition {
                        key,
                        from: from.clone(),
                        to,
                        at,
                    });
                }
            }
        }
        if self.transitions.len() > max_transitions {
            let excess = self.transitions.len() - max_transitions;
            self.transitions.drain(..excess);
        }

        observation::merge_into(&mut self.state, incoming);
        self.observation_count += 1;
        // Late timestamps still count as activity but never move the clock back.
        if at > self.updated_at {
            self.updated_at = at;
        }
        self.status = ContextStatus::Active;
        Ok(())
    }

    /// Mark idle. Has no effect on a closed context.
    pub fn mark_idle(&mut self) {
        if self.status == ContextStatus::Active {
            self.status = ContextStatus::Idle;
        }
    }

    /// Transition to closed. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.status = ContextStatus::Closed;
        true
    }

    /// Time since the last merged observation.
    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.updated_at
    }
}
