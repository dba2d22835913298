//! Acting stage: turn accepted, not yet proposed patterns that clear the
//! application thresholds into the reviewable action list.

use std::sync::Mutex;

use autonomic_core::config::ApplicationPolicy;
use autonomic_core::errors::{AutonomicError, AutonomicResult};
use autonomic_core::models::ProposedAction;
use autonomic_core::traits::{ActionApplier, ActionDescriber};
use autonomic_core::Pattern;

/// Proposed actions for the patterns meeting `policy`, ordered by
/// confidence desc, evidence desc, then id.
pub fn select_actions(
    unproposed: &[Pattern],
    policy: &ApplicationPolicy,
    describer: &dyn ActionDescriber,
) -> Vec<ProposedAction> {
    let mut eligible: Vec<&Pattern> = unproposed
        .iter()
        .filter(|p| {
            p.is_accepted()
                && p.confidence.value() >= policy.min_confidence
                && p.evidence_count >= policy.min_evidence
        })
        .collect();
    eligible.sort_by(|a, b| {
        b.confidence
            .value()
            .total_cmp(&a.confidence.value())
            .then(b.evidence_count.cmp(&a.evidence_count))
            .then(a.id.cmp(&b.id))
    });

    eligible
        .into_iter()
        .map(|p| ProposedAction {
            pattern_id: p.id.clone(),
            action_description: describer.describe(p),
            confidence: p.confidence.value(),
            evidence_count: p.evidence_count,
            tier: p.tier,
        })
        .collect()
}

/// Applier that only queues each proposed list for an operator to review.
#[derive(Debug, Default)]
pub struct ActionQueue {
    batches: Mutex<Vec<Vec<ProposedAction>>>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every queued batch, oldest first.
    pub fn take_all(&self) -> Vec<Vec<ProposedAction>> {
        match self.batches.lock() {
            Ok(mut batches) => std::mem::take(&mut *batches),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        match self.batches.lock() {
            Ok(batches) => batches.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionApplier for ActionQueue {
    fn propose(&self, actions: &[ProposedAction]) -> AutonomicResult<()> {
        let mut batches = self.batches.lock().map_err(|e| AutonomicError::ApplierFailed {
            reason: format!("action queue lock poisoned: {e}"),
        })?;
        batches.push(actions.to_vec());
        Ok(())
    }
}
