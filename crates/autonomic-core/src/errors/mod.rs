mod storage_error;
mod synthesis_error;

pub use storage_error::StorageError;
pub use synthesis_error::SynthesisError;

/// Result alias used throughout the workspace.
pub type AutonomicResult<T> = Result<T, AutonomicError>;

/// Top-level error for the autonomic pipeline.
///
/// Per-item failures (`InvalidObservation`, `SynthesisCycle`) are contained by
/// the caller; `StoreUnavailable` aborts the current loop iteration.
/// A rejected candidate is not an error: it is a [`crate::PatternStatus::Rejected`]
/// record carrying a [`crate::RejectionReason`].
#[derive(Debug, thiserror::Error)]
pub enum AutonomicError {
    #[error("invalid observation for subject '{subject_id}': {reason}")]
    InvalidObservation { subject_id: String, reason: String },

    #[error("pattern store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),

    #[error("synthesis integrity violation: {0}")]
    SynthesisCycle(#[from] SynthesisError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("iteration cancelled during {stage}")]
    Cancelled { stage: String },

    #[error("action applier failed: {reason}")]
    ApplierFailed { reason: String },
}

impl AutonomicError {
    /// Build an `InvalidObservation` error.
    pub fn invalid_observation(subject_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidObservation {
            subject_id: subject_id.into(),
            reason: reason.into(),
        }
    }

    /// Build a `ConfigError`.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Whether this error means the persistence layer could not be reached.
    /// Such failures abort the iteration and feed the retry policy.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
