//! # autonomic-storage
//!
//! Durable PatternStore backed by SQLite.
//! One serialized write connection plus a round-robin read pool (WAL mode),
//! versioned migrations, and an append-only audit log of every verdict.

pub mod audit;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use autonomic_core::errors::{AutonomicError, StorageError};

/// Convert a message into the workspace storage error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> AutonomicError {
    AutonomicError::StoreUnavailable(StorageError::SqliteError {
        message: message.into(),
    })
}
