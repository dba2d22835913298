//! PatternLearner: window of contexts in, tier-0 candidates out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;

use autonomic_core::config::LearningConfig;
use autonomic_core::constants::BASE_TIER;
use autonomic_core::errors::AutonomicResult;
use autonomic_core::pattern::{CanonicalEquivalence, StructuralEquivalence};
use autonomic_core::{Confidence, Context, Pattern, StructuralDescription};

use crate::aggregation::OccurrenceTable;
use crate::extraction;

/// Mines co-occurrences and state transitions from context snapshots.
///
/// Pure with respect to its inputs: the same window and configuration give
/// the same candidate ids, evidence counts, and order.
pub struct PatternLearner {
    config: LearningConfig,
    equivalence: Arc<dyn StructuralEquivalence>,
}

impl PatternLearner {
    pub fn new(config: LearningConfig, equivalence: Arc<dyn StructuralEquivalence>) -> Self {
        Self {
            config,
            equivalence,
        }
    }

    /// Learner with exact structural equality.
    pub fn with_exact_equivalence(config: LearningConfig) -> Self {
        Self::new(config, Arc::new(CanonicalEquivalence::default()))
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn observe(&self, contexts: &[Context]) -> AutonomicResult<Vec<Pattern>> {
        self.observe_at(contexts, Utc::now())
    }

    /// Candidates stamped with `now` as their creation time. Regularities seen
    /// in fewer than `effective_min_occurrences` distinct contexts are dropped.
    pub fn observe_at(&self, contexts: &[Context], now: DateTime<Utc>) -> AutonomicResult<Vec<Pattern>> {
        let extracted: Vec<(String, Vec<StructuralDescription>)> = contexts
            .par_iter()
            .map(|ctx| {
                (
                    ctx.id().to_string(),
                    extraction::extract(ctx, &self.config, self.equivalence.as_ref()),
                )
            })
            .collect();

        let mut table = OccurrenceTable::new();
        for (context_id, descriptions) in extracted {
            table.record(&context_id, descriptions)?;
        }
        let distinct = table.len();

        let min = self.config.effective_min_occurrences();
        let mut candidates = Vec::new();
        for occurrence in table.frequent(min) {
            let evidence = occurrence.contexts.len() as u64;
            candidates.push(Pattern::candidate(
                occurrence.description,
                BASE_TIER,
                Confidence::from_evidence(evidence, self.config.prior_weight),
                evidence,
                occurrence.contexts.into_iter().collect(),
                now,
            )?);
        }
        candidates.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            contexts = contexts.len(),
            distinct_regularities = distinct,
            candidates = candidates.len(),
            min_occurrences = min,
            "learning pass complete"
        );
        Ok(candidates)
    }
}
