use autonomic_core::{Pattern, PatternId, RejectionReason};

/// What the conflict check decided.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictResolution {
    /// No overlapping accepted pattern.
    Clear,
    /// Accept and mark these accepted patterns superseded.
    Supersede(Vec<PatternId>),
    /// Reject the candidate.
    Reject(RejectionReason),
}

/// Verdict and its effect on the store.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// The record as stored after the verdict was written.
    pub pattern: Pattern,
    /// True when this call moved the pattern into `Accepted`.
    pub newly_accepted: bool,
    /// True when the candidate only reinforced an already judged record.
    pub reinforced: bool,
    /// Prior patterns this call marked superseded.
    pub superseded: Vec<PatternId>,
    /// Set when this call rejected the candidate.
    pub rejection: Option<RejectionReason>,
}
