//! PatternValidator: runs the checks in order and writes the verdict.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use autonomic_core::config::ValidationPolicy;
use autonomic_core::errors::AutonomicResult;
use autonomic_core::traits::IPatternStore;
use autonomic_core::{Confidence, Pattern, PatternId, PatternStatus, RejectionReason};

use crate::checks::{age, conflict, thresholds};
use crate::outcome::{ConflictResolution, ValidationOutcome};

/// Stateless judge over a shared pattern store.
///
/// Given the same candidate, policy, store state, and clock, the verdict is
/// always the same. The only side effect is the store write.
pub struct PatternValidator {
    store: Arc<dyn IPatternStore>,
}

enum Verdict {
    Accept,
    Supersede(Vec<PatternId>),
    Reject(RejectionReason),
}

impl PatternValidator {
    pub fn new(store: Arc<dyn IPatternStore>) -> Self {
        Self { store }
    }

    /// Judge `candidate`, store the verdict, and return the stored record.
    pub fn validate(&self, candidate: &Pattern, policy: &ValidationPolicy) -> AutonomicResult<Pattern> {
        Ok(self.assess(candidate, policy, Utc::now())?.pattern)
    }

    /// [`Self::validate`] with an explicit clock and full outcome.
    ///
    /// A candidate whose id is already accepted or superseded is a
    /// reinforcement: its evidence and provenance are merged and the status
    /// is left alone. Anything else is judged on the combined evidence and
    /// the higher confidence of the stored record and the candidate.
    pub fn assess(
        &self,
        candidate: &Pattern,
        policy: &ValidationPolicy,
        now: DateTime<Utc>,
    ) -> AutonomicResult<ValidationOutcome> {
        let existing = self.store.get(&candidate.id)?;

        if let Some(prior) = &existing {
            if matches!(prior.status, PatternStatus::Accepted | PatternStatus::Superseded) {
                let mut reinforcement = candidate.clone();
                reinforcement.status = PatternStatus::Pending;
                reinforcement.rejection_reason = None;
                let stored = self.store.put(&reinforcement)?;
                debug!(
                    pattern_id = %stored.id.short(),
                    evidence_count = stored.evidence_count,
                    "pattern reinforced"
                );
                return Ok(ValidationOutcome {
                    pattern: stored,
                    newly_accepted: false,
                    reinforced: true,
                    superseded: Vec::new(),
                    rejection: None,
                });
            }
        }

        let (evidence, confidence, pending_since) = match &existing {
            Some(prior) => (
                prior.evidence_count.saturating_add(candidate.evidence_count),
                prior.confidence.max(candidate.confidence),
                prior.created_at.min(candidate.created_at),
            ),
            None => (
                candidate.evidence_count,
                candidate.confidence,
                candidate.created_at,
            ),
        };

        let verdict = self.judge(candidate, evidence, confidence, pending_since, policy, now)?;

        let mut record = candidate.clone();
        let (stored, superseded, rejection) = match verdict {
            Verdict::Accept => {
                record.status = PatternStatus::Accepted;
                record.rejection_reason = None;
                (self.store.put(&record)?, Vec::new(), None)
            }
            Verdict::Supersede(ids) => {
                let stored = self.store.accept_superseding(&record, &ids)?;
                (stored, ids, None)
            }
            Verdict::Reject(reason) => {
                record.status = PatternStatus::Rejected;
                record.rejection_reason = Some(reason.clone());
                (self.store.put(&record)?, Vec::new(), Some(reason))
            }
        };

        debug!(
            pattern_id = %stored.id.short(),
            tier = stored.tier,
            status = %stored.status,
            evidence_count = stored.evidence_count,
            confidence = stored.confidence.value(),
            "candidate judged"
        );

        let newly_accepted = stored.is_accepted()
            && existing.map_or(true, |prior| prior.status != PatternStatus::Accepted);
        Ok(ValidationOutcome {
            pattern: stored,
            newly_accepted,
            reinforced: false,
            superseded,
            rejection,
        })
    }

    fn judge(
        &self,
        candidate: &Pattern,
        evidence: u64,
        confidence: Confidence,
        pending_since: DateTime<Utc>,
        policy: &ValidationPolicy,
        now: DateTime<Utc>,
    ) -> AutonomicResult<Verdict> {
        if let Some(reason) = thresholds::check_confidence(confidence, policy) {
            return Ok(Verdict::Reject(reason));
        }
        if let Some(reason) = thresholds::check_evidence(evidence, policy) {
            return Ok(Verdict::Reject(reason));
        }

        let overlapping = self.store.find_overlapping(&candidate.description)?;
        let supersede = match conflict::resolve(&candidate.id, confidence, &overlapping, policy) {
            ConflictResolution::Reject(reason) => return Ok(Verdict::Reject(reason)),
            ConflictResolution::Supersede(ids) => Some(ids),
            ConflictResolution::Clear => None,
        };

        if let Some(reason) = age::check_age(pending_since, now, policy) {
            return Ok(Verdict::Reject(reason));
        }

        Ok(match supersede {
            Some(ids) => Verdict::Supersede(ids),
            None => Verdict::Accept,
        })
    }
}
