//! Co-occurring attribute sets.

use std::collections::BTreeMap;

use autonomic_core::config::LearningConfig;
use autonomic_core::{ObservationValue, StructuralDescription};

/// Every attribute alone, plus attribute sets of size 2..=`max_itemset_size`
/// drawn from the first `max_attributes_per_context` attributes (by key).
pub fn co_occurrences(
    attributes: &BTreeMap<String, ObservationValue>,
    config: &LearningConfig,
) -> Vec<StructuralDescription> {
    let mut out: Vec<StructuralDescription> = attributes
        .iter()
        .map(|(k, v)| StructuralDescription::co_occurrence([(k.clone(), v.clone())]))
        .collect();

    let pool: Vec<(&String, &ObservationValue)> = attributes
        .iter()
        .take(config.max_attributes_per_context)
        .collect();
    let largest = config.max_itemset_size.min(pool.len());
    for size in 2..=largest {
        for combo in combinations(pool.len(), size) {
            out.push(StructuralDescription::co_occurrence(
                combo.iter().map(|&i| (pool[i].0.clone(), pool[i].1.clone())),
            ));
        }
    }
    out
}

/// All `k`-subsets of `0..n` in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.clone());
        // Rightmost index that can still advance.
        let Some(pos) = (0..k).rev().find(|&i| idx[i] != i + n - k) else {
            return out;
        };
        idx[pos] += 1;
        for j in pos + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_are_lexicographic() {
        assert_eq!(
            combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
    }

    #[test]
    fn itemset_size_one_yields_singletons_only() {
        let attrs: BTreeMap<String, ObservationValue> = [
            ("a".to_string(), ObservationValue::Integer(1)),
            ("b".to_string(), ObservationValue::Integer(2)),
        ]
        .into_iter()
        .collect();
        let config = LearningConfig {
            max_itemset_size: 1,
            ..LearningConfig::default()
        };
        assert_eq!(co_occurrences(&attrs, &config).len(), 2);

        let pairs = LearningConfig {
            max_itemset_size: 2,
            ..LearningConfig::default()
        };
        assert_eq!(co_occurrences(&attrs, &pairs).len(), 3);
    }
}
