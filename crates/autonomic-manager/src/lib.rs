//! # autonomic-manager
//!
//! Composition root for the autonomic pipeline. [`AutonomicManager`] owns the
//! live context set and runs the control loop:
//! Observing, Learning, Synthesizing, Validating, Storing, Acting.
//! Per-item failures stay inside the iteration; store outages abort the
//! iteration and feed the retry and backoff policy. Nothing here applies an
//! action: accepted patterns are handed to an external [`ActionApplier`] as a
//! reviewable list.
//!
//! [`ActionApplier`]: autonomic_core::traits::ActionApplier

pub mod acting;
pub mod backoff;
pub mod engine;
pub mod lifecycle;
pub mod novelty;
pub mod report;

pub use acting::ActionQueue;
pub use engine::{AutonomicManager, CancelHandle};
pub use lifecycle::LoopStage;
pub use report::{IterationOutcome, IterationReport, SkipReason};
