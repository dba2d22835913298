/// Failures of the durable pattern store.
///
/// Every variant surfaces to callers as `AutonomicError::StoreUnavailable`,
/// which is the only failure the autonomic loop retries.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration to schema v{version} failed: {reason}")]
    MigrationFailed { version: u32, reason: String },

    /// A stored row could not be decoded back into a pattern.
    #[error("pattern record {id} is unreadable ({field}): {reason}")]
    CorruptRecord {
        id: String,
        field: &'static str,
        reason: String,
    },

    #[error("{resource} lock poisoned")]
    LockPoisoned { resource: &'static str },
}
