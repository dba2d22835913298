use serde::{Deserialize, Serialize};

use super::defaults;

/// What the validator does when a candidate structurally overlaps an
/// accepted pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Reject the new candidate.
    Reject,
    /// Accept the new candidate and mark the prior pattern superseded, provided
    /// the candidate's confidence strictly exceeds the prior one's.
    Supersede,
}

/// Thresholds a candidate must meet to be stored as accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub min_confidence: f64,
    pub min_evidence: u64,
    pub conflict_rule: ConflictRule,
    /// Candidates older than this are rejected as expired.
    pub max_candidate_age_secs: u64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_confidence: defaults::DEFAULT_MIN_CONFIDENCE,
            min_evidence: defaults::DEFAULT_MIN_EVIDENCE,
            conflict_rule: ConflictRule::Reject,
            max_candidate_age_secs: defaults::DEFAULT_MAX_CANDIDATE_AGE_SECS,
        }
    }
}

impl ValidationPolicy {
    pub fn max_candidate_age(&self) -> chrono::Duration {
        super::saturating_seconds(self.max_candidate_age_secs)
    }
}
