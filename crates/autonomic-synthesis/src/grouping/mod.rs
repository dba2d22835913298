//! Support sets and greedy grouping.

pub mod support;

use std::collections::{BTreeSet, HashSet};

use autonomic_core::config::SynthesisConfig;
use autonomic_core::Pattern;

use support::SupportIndex;

/// A set of patterns that hold together, with the contexts they all share.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub members: Vec<&'a Pattern>,
    pub shared: BTreeSet<String>,
}

/// Jaccard similarity of two sets; 0 when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Greedy seed grouping.
///
/// Seeds are eligible patterns at `target_tier - 1`, visited in order
/// (tier desc, evidence desc, id). Each seed absorbs unused patterns whose
/// support overlaps the group's shared support by at least `min_jaccard`
/// while the shared support stays at or above `min_shared_support`. A
/// pattern joins at most one group per pass.
pub fn form_groups<'a>(
    eligible: &[&'a Pattern],
    target_tier: u32,
    index: &SupportIndex,
    config: &SynthesisConfig,
) -> Vec<Group<'a>> {
    let mut ordered: Vec<&'a Pattern> = eligible.to_vec();
    ordered.sort_by(|a, b| {
        b.tier
            .cmp(&a.tier)
            .then(b.evidence_count.cmp(&a.evidence_count))
            .then(a.id.cmp(&b.id))
    });

    let mut used: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();

    for seed in &ordered {
        if seed.tier + 1 != target_tier || used.contains(seed.id.as_str()) {
            continue;
        }
        let mut shared = index.support(&seed.id);
        if shared.len() < config.min_shared_support {
            continue;
        }
        let mut members = vec![*seed];

        for other in &ordered {
            if members.len() >= config.max_group_size {
                break;
            }
            if used.contains(other.id.as_str())
                || members.iter().any(|m| m.id == other.id || related(m, other))
            {
                continue;
            }
            let support = index.support(&other.id);
            if jaccard(&shared, &support) < config.min_jaccard {
                continue;
            }
            let narrowed: BTreeSet<String> = shared.intersection(&support).cloned().collect();
            if narrowed.len() < config.min_shared_support {
                continue;
            }
            shared = narrowed;
            members.push(*other);
        }

        if members.len() >= config.min_group_size {
            for m in &members {
                used.insert(m.id.as_str());
            }
            groups.push(Group { members, shared });
        }
    }
    groups
}

/// One pattern is a direct member of the other.
fn related(a: &Pattern, b: &Pattern) -> bool {
    a.description.member_ids().contains(&b.id) || b.description.member_ids().contains(&a.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jaccard_basics() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["a", "b"])), 1.0);
        assert!((jaccard(&set(&["a", "b"]), &set(&["b", "c"])) - 1.0 / 3.0).abs() < 1e-12);
    }
}
