//! Span definitions for the control loop.

/// Span covering one control-loop iteration.
#[macro_export]
macro_rules! iteration_span {
    ($iteration:expr) => {
        $crate::tracing::info_span!("autonomic.iteration", iteration = $iteration)
    };
}

/// Span covering one stage of an iteration.
#[macro_export]
macro_rules! stage_span {
    ($stage:expr) => {
        $crate::tracing::debug_span!("autonomic.stage", stage = %$stage)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ITERATION: &str = "autonomic.iteration";
    pub const STAGE: &str = "autonomic.stage";
}
