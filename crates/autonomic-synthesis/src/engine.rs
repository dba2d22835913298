//! PatternSynthesizer: accepted lower-tier patterns in, tier-N candidates out.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use autonomic_core::config::SynthesisConfig;
use autonomic_core::constants::MAX_TIER;
use autonomic_core::errors::{AutonomicResult, SynthesisError};
use autonomic_core::{Confidence, Pattern, PatternStatus, StructuralDescription};

use crate::grouping::support::SupportIndex;
use crate::grouping::{self, Group};
use crate::integrity;

/// Candidates plus the ones discarded by the integrity checks.
#[derive(Debug, Default)]
pub struct SynthesisOutcome {
    pub candidates: Vec<Pattern>,
    pub discarded: Vec<SynthesisError>,
}

/// Builds composites of correlated accepted patterns. Never writes the store.
pub struct PatternSynthesizer {
    config: SynthesisConfig,
}

impl PatternSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Candidates at `target_tier` built from the eligible `source_patterns`.
    pub fn synthesize(
        &self,
        source_patterns: &[Pattern],
        target_tier: u32,
    ) -> AutonomicResult<Vec<Pattern>> {
        Ok(self
            .synthesize_at(source_patterns, target_tier, Utc::now())?
            .candidates)
    }

    /// Only accepted patterns below `target_tier` are used. Each group needs a
    /// member at `target_tier - 1`. A composite's evidence is the number of
    /// contexts shared by all members, its confidence the weakest member's,
    /// and its provenance the sorted member ids.
    pub fn synthesize_at(
        &self,
        source_patterns: &[Pattern],
        target_tier: u32,
        now: DateTime<Utc>,
    ) -> AutonomicResult<SynthesisOutcome> {
        if target_tier == 0 || target_tier > MAX_TIER {
            return Ok(SynthesisOutcome::default());
        }

        let eligible: Vec<&Pattern> = source_patterns
            .iter()
            .filter(|p| p.status == PatternStatus::Accepted && p.tier < target_tier)
            .collect();
        let known: HashMap<&str, &Pattern> = source_patterns
            .iter()
            .map(|p| (p.id.as_str(), p))
            .collect();
        let index = SupportIndex::new(&eligible);

        let groups = grouping::form_groups(&eligible, target_tier, &index, &self.config);

        let mut outcome = SynthesisOutcome::default();
        for group in &groups {
            let candidate = composite_candidate(group, target_tier, now)?;
            match integrity::check_candidate(&candidate, &known) {
                Ok(()) => outcome.candidates.push(candidate),
                Err(e) => {
                    warn!(
                        pattern_id = %candidate.id.short(),
                        error = %e,
                        "discarding synthesized candidate"
                    );
                    outcome.discarded.push(e);
                }
            }
        }
        outcome.candidates.sort_by(|a, b| a.id.cmp(&b.id));
        outcome.candidates.dedup_by(|a, b| a.id == b.id);

        debug!(
            target_tier = target_tier,
            eligible = eligible.len(),
            groups = groups.len(),
            candidates = outcome.candidates.len(),
            discarded = outcome.discarded.len(),
            "synthesis pass complete"
        );
        Ok(outcome)
    }
}

fn composite_candidate(group: &Group<'_>, tier: u32, now: DateTime<Utc>) -> AutonomicResult<Pattern> {
    let mut member_ids: Vec<String> = group.members.iter().map(|m| m.id.0.clone()).collect();
    member_ids.sort();
    let confidence = group
        .members
        .iter()
        .map(|m| m.confidence.value())
        .fold(1.0f64, f64::min);

    Pattern::candidate(
        StructuralDescription::composite(group.members.iter().map(|m| m.id.clone())),
        tier,
        Confidence::new(confidence),
        group.shared.len() as u64,
        member_ids,
        now,
    )
}
