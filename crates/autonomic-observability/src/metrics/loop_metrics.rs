use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lock-free counters updated by the control loop. Shared via `Arc`.
#[derive(Debug, Default)]
pub struct LoopMetrics {
    iterations_started: AtomicU64,
    iterations_completed: AtomicU64,
    iterations_failed: AtomicU64,
    iterations_cancelled: AtomicU64,
    iterations_skipped: AtomicU64,
    candidates_learned: AtomicU64,
    candidates_synthesized: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    superseded: AtomicU64,
    actions_proposed: AtomicU64,
    store_retries: AtomicU64,
}

/// Point-in-time copy of [`LoopMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub iterations_started: u64,
    pub iterations_completed: u64,
    pub iterations_failed: u64,
    pub iterations_cancelled: u64,
    pub iterations_skipped: u64,
    pub candidates_learned: u64,
    pub candidates_synthesized: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub superseded: u64,
    pub actions_proposed: u64,
    pub store_retries: u64,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iteration_started(&self) {
        self.iterations_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn iteration_completed(&self) {
        self.iterations_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn iteration_failed(&self) {
        self.iterations_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn iteration_cancelled(&self) {
        self.iterations_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn iteration_skipped(&self) {
        self.iterations_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_learned(&self, n: usize) {
        self.candidates_learned.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_synthesized(&self, n: usize) {
        self.candidates_synthesized
            .fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_accepted(&self, n: usize) {
        self.accepted.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_rejected(&self, n: usize) {
        self.rejected.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_superseded(&self, n: usize) {
        self.superseded.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_actions(&self, n: usize) {
        self.actions_proposed.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn store_retry(&self) {
        self.store_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            iterations_started: self.iterations_started.load(Ordering::Relaxed),
            iterations_completed: self.iterations_completed.load(Ordering::Relaxed),
            iterations_failed: self.iterations_failed.load(Ordering::Relaxed),
            iterations_cancelled: self.iterations_cancelled.load(Ordering::Relaxed),
            iterations_skipped: self.iterations_skipped.load(Ordering::Relaxed),
            candidates_learned: self.candidates_learned.load(Ordering::Relaxed),
            candidates_synthesized: self.candidates_synthesized.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            actions_proposed: self.actions_proposed.load(Ordering::Relaxed),
            store_retries: self.store_retries.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSnapshot {
    /// Fraction of judged candidates that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        let judged = self.accepted + self.rejected;
        if judged == 0 {
            return 0.0;
        }
        self.accepted as f64 / judged as f64
    }
}
