//! # autonomic-synthesis
//!
//! Groups correlated accepted patterns into higher-tier composites.
//! Correlation is measured on support sets (the contexts that back a
//! pattern); every composite is checked against the provenance DAG before
//! it is emitted.

pub mod engine;
pub mod grouping;
pub mod integrity;

pub use engine::{PatternSynthesizer, SynthesisOutcome};
