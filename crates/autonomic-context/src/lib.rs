//! # autonomic-context
//!
//! Owns the live set of contexts, one per observed subject.
//! Mutation is serialized per subject (one mutex per context, looked up
//! through a sharded `DashMap`), so different subjects update concurrently.

pub mod manager;
pub mod snapshot;
pub mod sweep;

pub use manager::ContextManager;
pub use snapshot::SnapshotStream;
pub use sweep::SweepOutcome;
