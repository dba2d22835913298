//! Property tests: storing the same candidate repeatedly yields one record
//! whose evidence is the sum of the writes.

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;

use autonomic_core::pattern::CanonicalEquivalence;
use autonomic_core::traits::IPatternStore;
use autonomic_core::{Confidence, Pattern, StructuralDescription};
use autonomic_storage::StorageEngine;

fn candidate(value: &str, evidence: u64, source: &str) -> Pattern {
    Pattern::candidate(
        StructuralDescription::co_occurrence([("event", value)]),
        0,
        Confidence::from_evidence(evidence, 1.0),
        evidence,
        vec![source.to_string()],
        Utc::now(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn repeated_puts_sum_evidence(writes in prop::collection::vec(1u64..50, 1..8)) {
        let store = StorageEngine::open_in_memory(Arc::new(CanonicalEquivalence::default())).unwrap();
        let mut max_conf = 0.0f64;
        for (i, evidence) in writes.iter().enumerate() {
            let p = candidate("login_failure", *evidence, &format!("ctx-{i}"));
            max_conf = max_conf.max(p.confidence.value());
            store.put(&p).unwrap();
        }
        let id = candidate("login_failure", 1, "x").id;
        let stored = store.get(&id).unwrap().unwrap();
        prop_assert_eq!(stored.evidence_count, writes.iter().sum::<u64>());
        prop_assert_eq!(stored.provenance.len(), writes.len());
        prop_assert!((stored.confidence.value() - max_conf).abs() < 1e-12);
        prop_assert_eq!(store.stats().unwrap().total(), 1);
    }

    #[test]
    fn distinct_bodies_get_distinct_records(values in prop::collection::btree_set("[a-z]{1,8}", 1..10)) {
        let store = StorageEngine::open_in_memory(Arc::new(CanonicalEquivalence::default())).unwrap();
        for v in &values {
            store.put(&candidate(v, 2, "c")).unwrap();
        }
        prop_assert_eq!(store.stats().unwrap().pending, values.len());
    }
}
