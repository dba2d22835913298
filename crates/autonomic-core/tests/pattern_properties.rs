//! Content-derived identity and calibration properties.

use proptest::prelude::*;

use autonomic_core::context::observation::{flatten, merge_into};
use autonomic_core::{Confidence, Observation, ObservationValue, PatternId, StructuralDescription};

fn scalar_strategy() -> impl Strategy<Value = ObservationValue> {
    prop_oneof![
        any::<bool>().prop_map(ObservationValue::Bool),
        (-50i64..50).prop_map(ObservationValue::Integer),
        "[a-z]{0,3}".prop_map(ObservationValue::Text),
    ]
}

fn observation_strategy() -> impl Strategy<Value = Observation> {
    let value = prop_oneof![
        3 => scalar_strategy(),
        1 => prop::collection::btree_map("[xy]", scalar_strategy(), 0..3)
            .prop_map(ObservationValue::Map),
    ];
    prop::collection::btree_map("[a-d]", value, 0..4)
}

proptest! {
    #[test]
    fn id_ignores_attribute_insertion_order(
        attributes in prop::collection::btree_map("[a-f]{1,3}", scalar_strategy(), 1..5),
        tier in 0u32..4,
    ) {
        let pairs: Vec<(String, ObservationValue)> = attributes.into_iter().collect();
        let forward = StructuralDescription::co_occurrence(pairs.clone());
        let backward = StructuralDescription::co_occurrence(pairs.into_iter().rev());

        let id = PatternId::derive(&forward, tier).unwrap();
        prop_assert_eq!(&id, &PatternId::derive(&backward, tier).unwrap());
        prop_assert_eq!(&id, &PatternId::derive(&forward, tier).unwrap());
        prop_assert_ne!(&id, &PatternId::derive(&forward, tier + 1).unwrap());
    }

    #[test]
    fn composite_id_ignores_member_order_and_repeats(
        members in prop::collection::vec("[0-9a-f]{4}", 2..6),
        rotate in 0usize..6,
    ) {
        let ids: Vec<PatternId> = members.iter().map(|m| PatternId::from(m.as_str())).collect();
        let mut shuffled = ids.clone();
        let by = rotate % shuffled.len();
        shuffled.rotate_left(by);
        shuffled.push(ids[0].clone());

        let a = PatternId::derive(&StructuralDescription::composite(ids), 1).unwrap();
        let b = PatternId::derive(&StructuralDescription::composite(shuffled), 1).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn more_evidence_never_lowers_confidence(
        evidence in 0u64..10_000,
        extra in 0u64..1_000,
        prior in 0.1f64..10.0,
    ) {
        let lower = Confidence::from_evidence(evidence, prior).value();
        let higher = Confidence::from_evidence(evidence + extra, prior).value();
        prop_assert!(lower <= higher);
        prop_assert!((0.0..1.0).contains(&higher));
    }

    #[test]
    fn merged_leaves_of_the_newer_observation_win(
        older in observation_strategy(),
        newer in observation_strategy(),
    ) {
        let mut merged = older;
        merge_into(&mut merged, newer.clone());
        let leaves = flatten(&merged);
        for (path, value) in flatten(&newer) {
            prop_assert_eq!(leaves.get(&path), Some(&value));
        }
    }
}
