use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Control-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Interval between scheduled iterations (seconds).
    pub cadence_secs: u64,
    /// Store retries within one iteration before it is marked failed.
    pub max_store_retries: u32,
    /// Base delay for exponential backoff between store retries (milliseconds).
    pub backoff_base_ms: u64,
    /// Cap on the number of ticks skipped after a failed iteration.
    pub max_backoff_ticks: u32,
    /// Number of iteration reports retained.
    pub history_len: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            cadence_secs: defaults::DEFAULT_CADENCE_SECS,
            max_store_retries: defaults::DEFAULT_MAX_STORE_RETRIES,
            backoff_base_ms: defaults::DEFAULT_BACKOFF_BASE_MS,
            max_backoff_ticks: defaults::DEFAULT_MAX_BACKOFF_TICKS,
            history_len: defaults::DEFAULT_HISTORY_LEN,
        }
    }
}

impl ManagerConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_secs(self.cadence_secs)
    }
}
