//! Structured log events for key pipeline operations.
//!
//! Each function emits one `tracing` event with structured fields.

/// An observation failed validation; the context is unchanged.
pub fn observation_rejected(subject_id: &str, reason: &str) {
    tracing::warn!(
        event = "observation_rejected",
        subject_id = %subject_id,
        reason = %reason,
        "observation rejected"
    );
}

/// A context was closed, explicitly or by the idle sweep.
pub fn context_closed(subject_id: &str, context_id: &str, observation_count: u64, swept: bool) {
    tracing::info!(
        event = "context_closed",
        subject_id = %subject_id,
        context_id = %context_id,
        observation_count = observation_count,
        swept = swept,
        "context closed"
    );
}

pub fn pattern_accepted(pattern_id: &str, tier: u32, confidence: f64, evidence_count: u64) {
    tracing::info!(
        event = "pattern_accepted",
        pattern_id = %pattern_id,
        tier = tier,
        confidence = confidence,
        evidence_count = evidence_count,
        "pattern accepted"
    );
}

pub fn pattern_rejected(pattern_id: &str, tier: u32, reason: &str) {
    tracing::debug!(
        event = "pattern_rejected",
        pattern_id = %pattern_id,
        tier = tier,
        reason = %reason,
        "pattern rejected"
    );
}

pub fn pattern_superseded(pattern_id: &str, superseded_by: &str) {
    tracing::info!(
        event = "pattern_superseded",
        pattern_id = %pattern_id,
        superseded_by = %superseded_by,
        "pattern superseded"
    );
}

/// A synthesized candidate broke the tier or provenance invariants and was discarded.
pub fn data_integrity_warning(pattern_id: &str, detail: &str) {
    tracing::warn!(
        event = "data_integrity_warning",
        pattern_id = %pattern_id,
        detail = %detail,
        "synthesized candidate discarded"
    );
}

pub fn stage_failed(stage: &str, error: &str, attempt: u32) {
    tracing::warn!(
        event = "stage_failed",
        stage = %stage,
        error = %error,
        attempt = attempt,
        "loop stage failed"
    );
}

pub fn iteration_completed(
    iteration: u64,
    outcome: &str,
    candidates: usize,
    accepted: usize,
    duration_ms: u64,
) {
    tracing::info!(
        event = "iteration_completed",
        iteration = iteration,
        outcome = %outcome,
        candidates = candidates,
        accepted = accepted,
        duration_ms = duration_ms,
        "control loop iteration completed"
    );
}

pub fn actions_proposed(count: usize) {
    tracing::info!(
        event = "actions_proposed",
        count = count,
        "actions proposed to applier"
    );
}
