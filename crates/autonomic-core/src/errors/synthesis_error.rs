/// Integrity violations detected while building synthesized candidates.
///
/// Each one is fatal to the offending candidate only, and indicates that an
/// upstream invariant was breached (a stored pattern with a bad provenance).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    #[error("provenance cycle through pattern {pattern_id}: {path}")]
    ProvenanceCycle { pattern_id: String, path: String },

    #[error("tier violation on {pattern_id}: tier {tier} does not exceed contributor {contributor} at tier {contributor_tier}")]
    TierViolation {
        pattern_id: String,
        tier: u32,
        contributor: String,
        contributor_tier: u32,
    },

    #[error("candidate {pattern_id} has empty provenance")]
    EmptyProvenance { pattern_id: String },
}
