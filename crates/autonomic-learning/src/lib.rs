//! # autonomic-learning
//!
//! Mines recurring structure from a window of context snapshots and emits
//! tier-0 candidate patterns. Extraction runs per context in parallel;
//! aggregation is an ordered fold, so output is deterministic.

pub mod aggregation;
pub mod engine;
pub mod extraction;

pub use engine::PatternLearner;
