//! Structural conflict against accepted patterns.

use autonomic_core::config::{ConflictRule, ValidationPolicy};
use autonomic_core::{Confidence, Pattern, PatternId, RejectionReason};

use crate::outcome::ConflictResolution;

/// Decide how a candidate with `confidence` relates to the overlapping
/// accepted patterns. Supersession needs strictly higher confidence than
/// every one of them.
pub fn resolve(
    candidate_id: &PatternId,
    confidence: Confidence,
    overlapping: &[Pattern],
    policy: &ValidationPolicy,
) -> ConflictResolution {
    let mut conflicts: Vec<&Pattern> = overlapping
        .iter()
        .filter(|p| p.is_accepted() && p.id != *candidate_id)
        .collect();
    if conflicts.is_empty() {
        return ConflictResolution::Clear;
    }
    conflicts.sort_by(|a, b| a.id.cmp(&b.id));
    let ids: Vec<PatternId> = conflicts.iter().map(|p| p.id.clone()).collect();

    match policy.conflict_rule {
        ConflictRule::Reject => ConflictResolution::Reject(RejectionReason::Conflict { with: ids }),
        ConflictRule::Supersede => {
            if conflicts.iter().all(|p| confidence.value() > p.confidence.value()) {
                ConflictResolution::Supersede(ids)
            } else {
                ConflictResolution::Reject(RejectionReason::Conflict { with: ids })
            }
        }
    }
}
