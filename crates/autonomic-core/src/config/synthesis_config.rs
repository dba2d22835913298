use serde::{Deserialize, Serialize};

use super::defaults;

/// PatternSynthesizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Tiers above 0 for which synthesis runs each iteration.
    pub enabled_tiers: Vec<u32>,
    /// Minimum number of supporting contexts shared by every group member.
    pub min_shared_support: usize,
    /// Minimum Jaccard overlap between a new member's support and the group's.
    pub min_jaccard: f64,
    /// Smallest group that yields a composite.
    pub min_group_size: usize,
    /// Largest group that yields a composite.
    pub max_group_size: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            enabled_tiers: defaults::DEFAULT_SYNTHESIS_TIERS.to_vec(),
            min_shared_support: defaults::DEFAULT_MIN_SHARED_SUPPORT,
            min_jaccard: defaults::DEFAULT_MIN_JACCARD,
            min_group_size: defaults::DEFAULT_MIN_GROUP_SIZE,
            max_group_size: defaults::DEFAULT_MAX_GROUP_SIZE,
        }
    }
}

impl SynthesisConfig {
    /// Enabled tiers, sorted ascending, deduplicated, tier 0 excluded.
    pub fn tiers(&self) -> Vec<u32> {
        let mut tiers: Vec<u32> = self
            .enabled_tiers
            .iter()
            .copied()
            .filter(|t| *t > 0)
            .collect();
        tiers.sort_unstable();
        tiers.dedup();
        tiers
    }

    pub fn is_tier_enabled(&self, tier: u32) -> bool {
        tier > 0 && self.enabled_tiers.contains(&tier)
    }
}
