//! PatternLearner against fixture scenarios, plus determinism and
//! order-independence properties.

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use autonomic_core::config::LearningConfig;
use autonomic_core::{Context, Observation, ObservationValue, Pattern, StructuralDescription};
use autonomic_learning::PatternLearner;
use test_fixtures::{ExpectedCandidate, Scenario};

fn contexts_from(scenario: &Scenario) -> Vec<Context> {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut events = scenario.events.clone();
    events.sort_by_key(|e| e.offset_secs);

    let mut by_subject: BTreeMap<String, Context> = BTreeMap::new();
    for event in events {
        let at = t0 + Duration::seconds(event.offset_secs);
        let observation: Observation = serde_json::from_value(event.observation).unwrap();
        by_subject
            .entry(event.subject_id.clone())
            .or_insert_with(|| Context::new(event.subject_id.clone(), at))
            .apply(observation, at, false, 64)
            .unwrap();
    }
    by_subject.into_values().collect()
}

fn expected_description(e: &ExpectedCandidate) -> StructuralDescription {
    let value = |v: &serde_json::Value| -> ObservationValue { serde_json::from_value(v.clone()).unwrap() };
    match e.kind.as_str() {
        "co_occurrence" => StructuralDescription::CoOccurrence {
            attributes: e.attributes.iter().map(|(k, v)| (k.clone(), value(v))).collect(),
        },
        "transition" => StructuralDescription::Transition {
            key: e.key.clone().unwrap(),
            from: value(e.from.as_ref().unwrap()),
            to: value(e.to.as_ref().unwrap()),
        },
        "sequence" => StructuralDescription::Sequence {
            key: e.key.clone().unwrap(),
            states: e.states.iter().map(value).collect(),
        },
        other => panic!("unknown expected kind {other}"),
    }
}

fn learner_for(scenario: &Scenario) -> PatternLearner {
    PatternLearner::with_exact_equivalence(LearningConfig {
        ignored_keys: scenario.ignored_keys.clone(),
        ..LearningConfig::default()
    })
}

#[test]
fn login_failure_yields_one_candidate_with_evidence_three() {
    let scenario = Scenario::load("login_failure");
    let contexts = contexts_from(&scenario);
    let candidates = learner_for(&scenario).observe(&contexts).unwrap();

    assert_eq!(candidates.len(), 1);
    let p = &candidates[0];
    assert_eq!(p.tier, 0);
    assert_eq!(p.evidence_count, 3);
    assert_eq!(p.provenance.len(), 3);
    assert!((p.confidence.value() - 0.75).abs() < 1e-12);
    assert_eq!(
        p.description,
        StructuralDescription::co_occurrence([("event", "login_failure")])
    );
}

#[test]
fn fixture_expectations_hold() {
    for scenario in Scenario::all() {
        let contexts = contexts_from(&scenario);
        let candidates = learner_for(&scenario).observe(&contexts).unwrap();

        for expected in &scenario.expected.candidates {
            let desc = expected_description(expected);
            let found = candidates
                .iter()
                .find(|p| p.description == desc)
                .unwrap_or_else(|| panic!("{}: missing {desc}", scenario.name));
            assert_eq!(found.evidence_count, expected.evidence_count, "{}: {desc}", scenario.name);
        }
        if scenario.expected.candidates.is_empty() {
            assert!(candidates.is_empty(), "{}: unexpected candidates", scenario.name);
        }
        for key in &scenario.expected.absent_keys {
            assert!(
                candidates.iter().all(|p| match &p.description {
                    StructuralDescription::CoOccurrence { attributes } => !attributes.contains_key(key),
                    StructuralDescription::Transition { key: k, .. }
                    | StructuralDescription::Sequence { key: k, .. } => k != key,
                    StructuralDescription::Composite { .. } => true,
                }),
                "{}: ignored key {key} was mined",
                scenario.name
            );
        }
    }
}

#[test]
fn duplicate_snapshots_count_once() {
    let scenario = Scenario::load("login_failure");
    let mut contexts = contexts_from(&scenario);
    let copy = contexts[0].clone();
    contexts.push(copy);
    let candidates = learner_for(&scenario).observe(&contexts).unwrap();
    assert_eq!(candidates[0].evidence_count, 3);
}

#[test]
fn min_occurrences_below_two_is_raised() {
    let scenario = Scenario::load("singletons");
    let contexts = contexts_from(&scenario);
    let learner = PatternLearner::with_exact_equivalence(LearningConfig {
        min_occurrences: 1,
        ..LearningConfig::default()
    });
    assert!(learner.observe(&contexts).unwrap().is_empty());
}

#[test]
fn transitions_can_be_disabled() {
    let scenario = Scenario::load("service_restarts");
    let contexts = contexts_from(&scenario);
    let learner = PatternLearner::with_exact_equivalence(LearningConfig {
        ignored_keys: scenario.ignored_keys.clone(),
        mine_transitions: false,
        ..LearningConfig::default()
    });
    let candidates = learner.observe(&contexts).unwrap();
    assert!(candidates
        .iter()
        .all(|p| !matches!(p.description, StructuralDescription::Transition { .. })));
}

#[test]
fn repeated_restart_cycles_become_sequences() {
    let scenario = Scenario::load("flapping_workers");
    let contexts = contexts_from(&scenario);
    let candidates = learner_for(&scenario).observe(&contexts).unwrap();

    let sequences: Vec<&Pattern> = candidates
        .iter()
        .filter(|p| matches!(p.description, StructuralDescription::Sequence { .. }))
        .collect();
    assert_eq!(sequences.len(), 1);
    assert_eq!(sequences[0].evidence_count, 2);
    assert_eq!(sequences[0].provenance.len(), 2);

    let single_steps_only = PatternLearner::with_exact_equivalence(LearningConfig {
        max_sequence_steps: 1,
        ..LearningConfig::default()
    });
    assert!(single_steps_only
        .observe(&contexts)
        .unwrap()
        .iter()
        .all(|p| !matches!(p.description, StructuralDescription::Sequence { .. })));
}

fn ids_and_evidence(patterns: &[Pattern]) -> Vec<(String, u64)> {
    patterns
        .iter()
        .map(|p| (p.id.0.clone(), p.evidence_count))
        .collect()
}

fn window_strategy() -> impl Strategy<Value = Vec<Observation>> {
    let value = prop_oneof![
        Just(ObservationValue::from("a")),
        Just(ObservationValue::from("b")),
        (0i64..3).prop_map(ObservationValue::Integer),
    ];
    let observation = prop::collection::btree_map("[kmn]", value, 1..4);
    prop::collection::vec(observation, 0..12)
}

proptest! {
    #[test]
    fn rerun_on_unchanged_window_is_identical(window in window_strategy()) {
        let t0 = Utc::now();
        let contexts: Vec<Context> = window
            .into_iter()
            .enumerate()
            .map(|(i, o)| {
                let mut c = Context::new(format!("s{i}"), t0);
                c.apply(o, t0, false, 8).unwrap();
                c
            })
            .collect();
        let learner = PatternLearner::with_exact_equivalence(LearningConfig::default());
        let first = learner.observe_at(&contexts, t0).unwrap();
        let second = learner.observe_at(&contexts, t0).unwrap();
        prop_assert_eq!(&first, &second);

        let mut reversed = contexts.clone();
        reversed.reverse();
        let third = learner.observe_at(&reversed, t0).unwrap();
        prop_assert_eq!(ids_and_evidence(&first), ids_and_evidence(&third));

        for p in &first {
            prop_assert!(p.evidence_count >= 2);
            prop_assert_eq!(p.tier, 0);
        }
    }
}
