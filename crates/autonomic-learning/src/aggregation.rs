//! Fold per-context descriptions into occurrence counts.

use std::collections::{BTreeMap, BTreeSet};

use autonomic_core::errors::AutonomicResult;
use autonomic_core::StructuralDescription;

/// One regularity and the distinct contexts it was seen in.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub description: StructuralDescription,
    pub contexts: BTreeSet<String>,
}

/// Occurrences keyed by canonical JSON. Counting distinct context ids makes
/// the fold commutative and idempotent per context.
#[derive(Debug, Default)]
pub struct OccurrenceTable {
    entries: BTreeMap<String, Occurrence>,
}

impl OccurrenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        context_id: &str,
        descriptions: Vec<StructuralDescription>,
    ) -> AutonomicResult<()> {
        for description in descriptions {
            let key = description.canonical_json()?;
            self.entries
                .entry(key)
                .or_insert_with(|| Occurrence {
                    description,
                    contexts: BTreeSet::new(),
                })
                .contexts
                .insert(context_id.to_string());
        }
        Ok(())
    }

    /// Occurrences seen in at least `min_occurrences` distinct contexts.
    pub fn frequent(self, min_occurrences: u64) -> impl Iterator<Item = Occurrence> {
        self.entries
            .into_values()
            .filter(move |o| o.contexts.len() as u64 >= min_occurrences)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
