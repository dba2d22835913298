use serde::{Deserialize, Serialize};

use super::defaults;

/// ContextManager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Seconds without an update before a context is marked idle.
    pub idle_after_secs: u64,
    /// Seconds without an update before the sweep closes a context.
    pub idle_timeout_secs: u64,
    /// Reject observations that change the value kind of an existing key.
    pub strict_types: bool,
    /// Maximum state transitions retained per context (oldest dropped first).
    pub max_transitions: usize,
    /// Capacity of the queue of final snapshots awaiting the learner.
    pub max_pending_final_snapshots: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            idle_after_secs: defaults::DEFAULT_IDLE_AFTER_SECS,
            idle_timeout_secs: defaults::DEFAULT_IDLE_TIMEOUT_SECS,
            strict_types: defaults::DEFAULT_STRICT_TYPES,
            max_transitions: defaults::DEFAULT_MAX_TRANSITIONS,
            max_pending_final_snapshots: defaults::DEFAULT_MAX_PENDING_FINAL_SNAPSHOTS,
        }
    }
}

impl ContextConfig {
    pub fn idle_after(&self) -> chrono::Duration {
        super::saturating_seconds(self.idle_after_secs)
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        super::saturating_seconds(self.idle_timeout_secs)
    }
}
