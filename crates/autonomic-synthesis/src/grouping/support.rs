//! Support sets: the contexts backing a pattern.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use autonomic_core::{Pattern, PatternId};

/// Memoized support lookup over a fixed set of patterns.
///
/// Tier-0 support is the provenance (context ids). Above tier 0 it is the
/// intersection of the members' supports; unknown members contribute nothing.
pub struct SupportIndex<'a> {
    patterns: HashMap<&'a str, &'a Pattern>,
    memo: RefCell<HashMap<String, BTreeSet<String>>>,
}

impl<'a> SupportIndex<'a> {
    pub fn new(patterns: &[&'a Pattern]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| (p.id.as_str(), *p)).collect(),
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn support(&self, id: &PatternId) -> BTreeSet<String> {
        self.support_guarded(id.as_str(), &mut Vec::new())
    }

    fn support_guarded(&self, id: &str, visiting: &mut Vec<String>) -> BTreeSet<String> {
        if let Some(cached) = self.memo.borrow().get(id) {
            return cached.clone();
        }
        // A provenance loop has no well-defined support.
        if visiting.iter().any(|v| v == id) {
            return BTreeSet::new();
        }
        let Some(pattern) = self.patterns.get(id) else {
            return BTreeSet::new();
        };

        let support = if pattern.is_base_tier() {
            pattern.provenance.iter().cloned().collect()
        } else {
            visiting.push(id.to_string());
            let mut members = pattern.provenance.iter();
            let mut acc = match members.next() {
                Some(first) => self.support_guarded(first, visiting),
                None => BTreeSet::new(),
            };
            for member in members {
                if acc.is_empty() {
                    break;
                }
                let next = self.support_guarded(member, visiting);
                acc = acc.intersection(&next).cloned().collect();
            }
            visiting.pop();
            acc
        };

        self.memo
            .borrow_mut()
            .insert(id.to_string(), support.clone());
        support
    }
}
