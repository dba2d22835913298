use serde::{Deserialize, Serialize};

use super::defaults;

/// PatternLearner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Minimum number of independent contexts a regularity must appear in.
    /// Values below 2 are raised to 2: singletons are never patterns.
    pub min_occurrences: u64,
    /// Largest co-occurring attribute set mined per context.
    pub max_itemset_size: usize,
    /// Attributes considered per context when building itemsets larger than one.
    pub max_attributes_per_context: usize,
    /// Flattened keys never mined (timestamps, request ids, ...).
    pub ignored_keys: Vec<String>,
    /// Pseudo-count used by evidence calibration.
    pub prior_weight: f64,
    /// Mine repeated state transitions in addition to co-occurrences.
    pub mine_transitions: bool,
    /// Longest run of consecutive transitions on one key mined as a sequence.
    /// Below 2 only single transitions are mined.
    pub max_sequence_steps: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_occurrences: defaults::DEFAULT_MIN_OCCURRENCES,
            max_itemset_size: defaults::DEFAULT_MAX_ITEMSET_SIZE,
            max_attributes_per_context: defaults::DEFAULT_MAX_ATTRIBUTES_PER_CONTEXT,
            ignored_keys: Vec::new(),
            prior_weight: defaults::DEFAULT_PRIOR_WEIGHT,
            mine_transitions: defaults::DEFAULT_MINE_TRANSITIONS,
            max_sequence_steps: defaults::DEFAULT_MAX_SEQUENCE_STEPS,
        }
    }
}

impl LearningConfig {
    /// Effective occurrence floor.
    pub fn effective_min_occurrences(&self) -> u64 {
        self.min_occurrences.max(2)
    }
}
