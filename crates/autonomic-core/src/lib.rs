//! # autonomic-core
//!
//! Foundation crate for the autonomic pattern pipeline.
//! Defines contexts, patterns, structural descriptions, errors, config,
//! and the traits that connect the pipeline stages.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod context;
pub mod errors;
pub mod models;
pub mod pattern;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::AutonomicConfig;
pub use context::{Context, ContextStatus, Observation, ObservationValue};
pub use errors::{AutonomicError, AutonomicResult};
pub use pattern::{
    Confidence, Pattern, PatternId, PatternStatus, RejectionReason, StructuralDescription,
};
