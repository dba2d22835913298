use serde::{Deserialize, Serialize};

use super::defaults;

/// Thresholds a newly accepted pattern must meet before it is proposed to
/// the external applier. Must be at least as strict as the [`super::ValidationPolicy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPolicy {
    pub min_confidence: f64,
    pub min_evidence: u64,
}

impl Default for ApplicationPolicy {
    fn default() -> Self {
        Self {
            min_confidence: defaults::DEFAULT_APPLY_MIN_CONFIDENCE,
            min_evidence: defaults::DEFAULT_APPLY_MIN_EVIDENCE,
        }
    }
}
