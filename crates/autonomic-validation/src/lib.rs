//! # autonomic-validation
//!
//! Judges candidate patterns against a [`ValidationPolicy`] and writes the
//! verdict to the pattern store. Checks run in a fixed order: confidence,
//! evidence, structural conflict, age. The first failing check decides.
//!
//! [`ValidationPolicy`]: autonomic_core::config::ValidationPolicy

pub mod checks;
pub mod engine;
pub mod outcome;

pub use engine::PatternValidator;
pub use outcome::{ConflictResolution, ValidationOutcome};
