//! Synthesis grouping rules and the tier invariant over random pattern graphs.

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;

use autonomic_core::config::SynthesisConfig;
use autonomic_core::{
    Confidence, Pattern, PatternId, PatternStatus, StructuralDescription,
};
use autonomic_synthesis::PatternSynthesizer;

fn base(name: &str, contexts: &[&str], confidence: f64) -> Pattern {
    let mut p = Pattern::candidate(
        StructuralDescription::co_occurrence([("event", name)]),
        0,
        Confidence::new(confidence),
        contexts.len() as u64,
        contexts.iter().map(|s| s.to_string()).collect(),
        Utc::now(),
    )
    .unwrap();
    p.status = PatternStatus::Accepted;
    p
}

fn composite_of(members: &[&Pattern], tier: u32, evidence: u64) -> Pattern {
    let mut ids: Vec<String> = members.iter().map(|m| m.id.0.clone()).collect();
    ids.sort();
    let mut p = Pattern::candidate(
        StructuralDescription::composite(members.iter().map(|m| m.id.clone())),
        tier,
        Confidence::new(0.8),
        evidence,
        ids,
        Utc::now(),
    )
    .unwrap();
    p.status = PatternStatus::Accepted;
    p
}

#[test]
fn correlated_base_patterns_form_one_composite() {
    let a = base("login_failure", &["c1", "c2", "c3"], 0.75);
    let b = base("account_locked", &["c1", "c2", "c3", "c4"], 0.8);
    let unrelated = base("disk_full", &["c7", "c8"], 0.67);

    let synth = PatternSynthesizer::new(SynthesisConfig::default());
    let out = synth.synthesize(&[a.clone(), b.clone(), unrelated.clone()], 1).unwrap();

    assert_eq!(out.len(), 1);
    let c = &out[0];
    assert_eq!(c.tier, 1);
    assert_eq!(c.evidence_count, 3);
    assert_eq!(c.confidence.value(), 0.75);
    let mut expected = vec![a.id.0.clone(), b.id.0.clone()];
    expected.sort();
    assert_eq!(c.provenance, expected);
    assert_eq!(c.status, PatternStatus::Pending);
    assert!(!c.provenance.contains(&unrelated.id.0));
}

#[test]
fn non_accepted_sources_are_ignored() {
    let a = base("a", &["c1", "c2"], 0.7);
    let mut b = base("b", &["c1", "c2"], 0.7);
    b.status = PatternStatus::Rejected;
    let synth = PatternSynthesizer::new(SynthesisConfig::default());
    assert!(synth.synthesize(&[a, b], 1).unwrap().is_empty());
}

#[test]
fn tier_zero_target_yields_nothing() {
    let a = base("a", &["c1", "c2"], 0.7);
    let b = base("b", &["c1", "c2"], 0.7);
    let synth = PatternSynthesizer::new(SynthesisConfig::default());
    assert!(synth.synthesize(&[a, b], 0).unwrap().is_empty());
}

#[test]
fn tier_two_requires_a_tier_one_contributor() {
    let a = base("a", &["c1", "c2", "c3"], 0.7);
    let b = base("b", &["c1", "c2", "c3"], 0.7);
    let synth = PatternSynthesizer::new(SynthesisConfig::default());
    // Only tier-0 inputs: nothing at tier 1, so no tier-2 composite.
    assert!(synth.synthesize(&[a.clone(), b.clone()], 2).unwrap().is_empty());

    let c = base("c", &["c1", "c2", "c3"], 0.7);
    let d = base("d", &["c1", "c2", "c3"], 0.7);
    let ab = composite_of(&[&a, &b], 1, 3);
    let cd = composite_of(&[&c, &d], 1, 3);
    let out = synth.synthesize(&[a, b, c, d, ab.clone(), cd.clone()], 2).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].tier, 2);
    assert!(out[0].provenance.contains(&ab.id.0));
}

#[test]
fn group_size_is_bounded() {
    let contexts = ["c1", "c2", "c3"];
    let patterns: Vec<Pattern> = (0..6)
        .map(|i| base(&format!("e{i}"), &contexts, 0.75))
        .collect();
    let synth = PatternSynthesizer::new(SynthesisConfig {
        max_group_size: 3,
        ..SynthesisConfig::default()
    });
    let out = synth.synthesize(&patterns, 1).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|c| c.provenance.len() == 3));
}

#[test]
fn corrupt_record_does_not_abort_synthesis() {
    let a = base("a", &["c1", "c2", "c3"], 0.7);
    let b = base("b", &["c1", "c2", "c3"], 0.7);
    let c = base("c", &["c1", "c2", "c3"], 0.7);
    let d = base("d", &["c1", "c2", "c3"], 0.7);
    let mut ab = composite_of(&[&a, &b], 1, 3);
    ab.provenance.push("missing-pattern".to_string());
    let cd = composite_of(&[&c, &d], 1, 3);

    let synth = PatternSynthesizer::new(SynthesisConfig::default());
    let outcome = synth
        .synthesize_at(&[a, b, c, d, ab, cd], 2, Utc::now())
        .unwrap();
    // The corrupt record has no resolvable support, so it cannot seed a group.
    assert!(outcome.candidates.iter().all(|c| c.tier == 2));
    assert!(outcome.candidates.len() <= 1);
}

/// Random accepted graphs: tier-0 patterns over a small context pool, plus
/// tier-1 composites of random tier-0 pairs.
fn graph_strategy() -> impl Strategy<Value = Vec<Pattern>> {
    let base_specs = prop::collection::vec(
        (prop::collection::btree_set(0usize..6, 1..6), 0.3f64..1.0),
        2..10,
    );
    (base_specs, prop::collection::vec((0usize..10, 0usize..10), 0..6)).prop_map(
        |(specs, pairs)| {
            let bases: Vec<Pattern> = specs
                .iter()
                .enumerate()
                .map(|(i, (ctxs, conf))| {
                    let names: Vec<String> = ctxs.iter().map(|c| format!("ctx{c}")).collect();
                    let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                    base(&format!("p{i}"), &refs, *conf)
                })
                .collect();
            let mut all = bases.clone();
            for (x, y) in pairs {
                let (x, y) = (x % bases.len(), y % bases.len());
                if x != y {
                    all.push(composite_of(&[&bases[x], &bases[y]], 1, 2));
                }
            }
            all
        },
    )
}

proptest! {
    #[test]
    fn synthesized_tier_exceeds_every_contributor(
        patterns in graph_strategy(),
        target in 1u32..4,
    ) {
        let synth = PatternSynthesizer::new(SynthesisConfig {
            min_shared_support: 1,
            min_jaccard: 0.2,
            ..SynthesisConfig::default()
        });
        let tiers: HashMap<PatternId, u32> =
            patterns.iter().map(|p| (p.id.clone(), p.tier)).collect();
        let out = synth.synthesize(&patterns, target).unwrap();
        for c in &out {
            prop_assert_eq!(c.tier, target);
            prop_assert!(!c.provenance.is_empty());
            let max_contributor = c
                .provenance
                .iter()
                .map(|id| tiers[&PatternId(id.clone())])
                .max()
                .unwrap();
            prop_assert!(c.tier > max_contributor);
            prop_assert_eq!(max_contributor, target - 1);
        }
    }
}
