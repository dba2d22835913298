//! Reinforcement accounting: credit only evidence the store has not seen.
//!
//! The learner re-mines the whole live window every iteration, so a candidate
//! usually repeats evidence already recorded. Tier-0 evidence is a set of
//! context ids and is credited per new id. Above tier 0 the candidate's count
//! is a snapshot, so only the excess over the stored count is credited.

use std::collections::HashSet;

use autonomic_core::Pattern;

/// The portion of `candidate` not yet credited on `stored`, or `None` when
/// nothing is new.
pub fn credit_new_evidence(candidate: &Pattern, stored: Option<&Pattern>) -> Option<Pattern> {
    let Some(stored) = stored else {
        return Some(candidate.clone());
    };

    if candidate.is_base_tier() {
        let seen: HashSet<&str> = stored.provenance.iter().map(String::as_str).collect();
        let fresh: Vec<String> = candidate
            .provenance
            .iter()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return None;
        }
        let mut credited = candidate.clone();
        credited.evidence_count = fresh.len() as u64;
        credited.provenance = fresh;
        return Some(credited);
    }

    let excess = candidate.evidence_count.saturating_sub(stored.evidence_count);
    if excess == 0 {
        return None;
    }
    let mut credited = candidate.clone();
    credited.evidence_count = excess;
    Some(credited)
}
