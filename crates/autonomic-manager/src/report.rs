//! Per-iteration reports and the bounded history ring.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use autonomic_core::models::{ProposedAction, StoreStats};

use crate::lifecycle::LoopStage;

/// Why an iteration did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Another iteration held the single-execution guard.
    AlreadyRunning,
    /// A recent store outage; this many further ticks will be skipped.
    Backoff { remaining_ticks: u32 },
}

/// How an iteration ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IterationOutcome {
    Completed,
    Failed { stage: LoopStage, error: String },
    Cancelled { stage: LoopStage },
    Skipped { reason: SkipReason },
}

impl IterationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            IterationOutcome::Completed => "completed",
            IterationOutcome::Failed { .. } => "failed",
            IterationOutcome::Cancelled { .. } => "cancelled",
            IterationOutcome::Skipped { .. } => "skipped",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, IterationOutcome::Completed)
    }
}

/// What one iteration did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationReport {
    /// Sequence number; 0 for iterations that never started.
    pub iteration: u64,
    pub started_at: DateTime<Utc>,
    pub outcome: IterationOutcome,
    /// Last stage entered.
    pub stage_reached: LoopStage,
    /// Live snapshots plus drained final snapshots handed to the learner.
    pub contexts_observed: usize,
    pub contexts_closed: usize,
    pub candidates_learned: usize,
    pub candidates_synthesized: usize,
    /// Synthesized candidates dropped by the integrity checks.
    pub candidates_discarded: usize,
    /// Candidates with nothing the store had not already credited.
    pub candidates_unchanged: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub reinforced: usize,
    pub superseded: usize,
    /// Store counts read in the Storing stage.
    pub store: Option<StoreStats>,
    pub actions: Vec<ProposedAction>,
    pub duration_ms: u64,
}

impl IterationReport {
    pub(crate) fn new(iteration: u64, started_at: DateTime<Utc>) -> Self {
        Self {
            iteration,
            started_at,
            outcome: IterationOutcome::Completed,
            stage_reached: LoopStage::Idle,
            contexts_observed: 0,
            contexts_closed: 0,
            candidates_learned: 0,
            candidates_synthesized: 0,
            candidates_discarded: 0,
            candidates_unchanged: 0,
            accepted: 0,
            rejected: 0,
            reinforced: 0,
            superseded: 0,
            store: None,
            actions: Vec::new(),
            duration_ms: 0,
        }
    }

    pub(crate) fn skipped(started_at: DateTime<Utc>, reason: SkipReason) -> Self {
        let mut report = Self::new(0, started_at);
        report.outcome = IterationOutcome::Skipped { reason };
        report
    }
}

/// Most recent reports, oldest first.
#[derive(Debug)]
pub(crate) struct ReportHistory {
    capacity: usize,
    reports: VecDeque<IterationReport>,
}

impl ReportHistory {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            reports: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, report: IterationReport) {
        while self.reports.len() >= self.capacity {
            self.reports.pop_front();
        }
        self.reports.push_back(report);
    }

    pub(crate) fn to_vec(&self) -> Vec<IterationReport> {
        self.reports.iter().cloned().collect()
    }

    pub(crate) fn last(&self) -> Option<IterationReport> {
        self.reports.back().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_drops_oldest() {
        let mut history = ReportHistory::new(2);
        for i in 1..=3 {
            history.push(IterationReport::new(i, Utc::now()));
        }
        let kept: Vec<u64> = history.to_vec().iter().map(|r| r.iteration).collect();
        assert_eq!(kept, vec![2, 3]);
        assert_eq!(history.last().map(|r| r.iteration), Some(3));
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = IterationOutcome::Failed {
            stage: LoopStage::Synthesizing,
            error: "down".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["stage"], "synthesizing");
    }
}
