//! Append-only audit log of pattern writes.

mod logger;

pub use logger::{AuditEntry, AuditLogger, AuditOperation};
