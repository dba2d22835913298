use autonomic_core::config::ValidationPolicy;
use autonomic_core::{Confidence, RejectionReason};

pub fn check_confidence(confidence: Confidence, policy: &ValidationPolicy) -> Option<RejectionReason> {
    (confidence.value() < policy.min_confidence).then(|| RejectionReason::LowConfidence {
        confidence: confidence.value(),
        threshold: policy.min_confidence,
    })
}

pub fn check_evidence(evidence: u64, policy: &ValidationPolicy) -> Option<RejectionReason> {
    (evidence < policy.min_evidence).then_some(RejectionReason::InsufficientEvidence {
        evidence,
        required: policy.min_evidence,
    })
}
