//! Individual validation checks. Each returns `Some(reason)` on failure.

pub mod age;
pub mod conflict;
pub mod thresholds;
