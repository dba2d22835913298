use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};

use autonomic_core::config::LearningConfig;
use autonomic_core::{Context, Observation, ObservationValue};
use autonomic_learning::PatternLearner;

/// 1K contexts with 8 attributes each drawn from small value pools.
fn build_window() -> Vec<Context> {
    let t0 = Utc::now();
    (0..1_000)
        .map(|i| {
            let mut obs = Observation::new();
            for k in 0..8 {
                obs.insert(
                    format!("attr{k}"),
                    ObservationValue::Integer(((i * (k + 3)) % 5) as i64),
                );
            }
            let mut ctx = Context::new(format!("subject-{i}"), t0);
            ctx.apply(obs, t0, false, 16).expect("well-formed observation");
            ctx
        })
        .collect()
}

fn bench_observe_pairs(c: &mut Criterion) {
    let window = build_window();
    let learner = PatternLearner::with_exact_equivalence(LearningConfig::default());
    c.bench_function("observe_1k_contexts_pairs", |b| {
        b.iter(|| learner.observe(&window).expect("learning pass"));
    });
}

fn bench_observe_triples(c: &mut Criterion) {
    let window = build_window();
    let learner = PatternLearner::with_exact_equivalence(LearningConfig {
        max_itemset_size: 3,
        ..LearningConfig::default()
    });
    c.bench_function("observe_1k_contexts_triples", |b| {
        b.iter(|| learner.observe(&window).expect("learning pass"));
    });
}

criterion_group!(benches, bench_observe_pairs, bench_observe_triples);
criterion_main!(benches);
