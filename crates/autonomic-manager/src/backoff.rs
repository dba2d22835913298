//! Store retry delays within an iteration and tick skipping across iterations.

use std::time::Duration;

use autonomic_core::config::ManagerConfig;
use autonomic_core::constants::MAX_BACKOFF_EXPONENT;

/// Delay before retry `attempt` (0-based): `backoff_base_ms * 2^attempt`.
pub fn retry_delay(config: &ManagerConfig, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.min(MAX_BACKOFF_EXPONENT);
    Duration::from_millis(config.backoff_base_ms.saturating_mul(factor))
}

/// Tracks consecutive failed iterations. After the k-th consecutive failure
/// the next `2^k - 1` ticks are skipped, capped at `max_backoff_ticks`.
#[derive(Debug, Default)]
pub struct TickBackoff {
    consecutive_failures: u32,
    skip_remaining: u32,
}

impl TickBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, max_backoff_ticks: u32) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let exponent = self.consecutive_failures.min(MAX_BACKOFF_EXPONENT);
        let ticks = (1u32 << exponent) - 1;
        self.skip_remaining = ticks.min(max_backoff_ticks);
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.skip_remaining = 0;
    }

    /// Consume one skipped tick. `Some(remaining)` when this tick is skipped.
    pub fn take_skip(&mut self) -> Option<u32> {
        if self.skip_remaining == 0 {
            return None;
        }
        self.skip_remaining -= 1;
        Some(self.skip_remaining)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_doubles_and_caps() {
        let config = ManagerConfig {
            backoff_base_ms: 10,
            ..ManagerConfig::default()
        };
        assert_eq!(retry_delay(&config, 0), Duration::from_millis(10));
        assert_eq!(retry_delay(&config, 3), Duration::from_millis(80));
        assert_eq!(retry_delay(&config, 40), retry_delay(&config, MAX_BACKOFF_EXPONENT));
    }

    #[test]
    fn skipped_ticks_grow_then_cap() {
        let mut backoff = TickBackoff::new();
        backoff.record_failure(8);
        assert_eq!(backoff.take_skip(), Some(0));
        assert_eq!(backoff.take_skip(), None);

        backoff.record_failure(8);
        let skipped = std::iter::from_fn(|| backoff.take_skip()).count();
        assert_eq!(skipped, 3);

        for _ in 0..10 {
            backoff.record_failure(8);
        }
        let skipped = std::iter::from_fn(|| backoff.take_skip()).count();
        assert_eq!(skipped, 8);

        backoff.record_success();
        assert_eq!(backoff.consecutive_failures(), 0);
        assert_eq!(backoff.take_skip(), None);
    }
}
