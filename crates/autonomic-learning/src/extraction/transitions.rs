//! State-transition descriptions taken from a context's transition log:
//! single steps, plus runs of consecutive steps on one key.

use std::collections::BTreeMap;

use autonomic_core::config::LearningConfig;
use autonomic_core::context::StateTransition;
use autonomic_core::{Context, ObservationValue, StructuralDescription};

use super::is_ignored;

pub fn repeated_transitions(context: &Context, config: &LearningConfig) -> Vec<StructuralDescription> {
    minable(context, config)
        .map(|t| StructuralDescription::Transition {
            key: t.key.clone(),
            from: t.from.clone(),
            to: t.to.clone(),
        })
        .collect()
}

/// Every contiguous run of 2..=`max_sequence_steps` transitions on one key.
pub fn repeated_sequences(context: &Context, config: &LearningConfig) -> Vec<StructuralDescription> {
    if config.max_sequence_steps < 2 {
        return Vec::new();
    }

    let mut by_key: BTreeMap<&str, Vec<&StateTransition>> = BTreeMap::new();
    for t in minable(context, config) {
        by_key.entry(t.key.as_str()).or_default().push(t);
    }

    let mut found = Vec::new();
    for (key, steps) in by_key {
        for chain in chains(&steps) {
            for len in 2..=config.max_sequence_steps.min(chain.len() - 1) {
                for run in chain.windows(len + 1) {
                    found.push(StructuralDescription::Sequence {
                        key: key.to_string(),
                        states: run.to_vec(),
                    });
                }
            }
        }
    }
    found
}

fn minable<'a>(
    context: &'a Context,
    config: &'a LearningConfig,
) -> impl Iterator<Item = &'a StateTransition> + 'a {
    context
        .transitions
        .iter()
        .filter(|t| !is_ignored(&t.key, &config.ignored_keys))
}

/// Visited states, split wherever one step does not start where the
/// previous one ended.
fn chains(steps: &[&StateTransition]) -> Vec<Vec<ObservationValue>> {
    let mut chains: Vec<Vec<ObservationValue>> = Vec::new();
    for step in steps {
        match chains.last_mut() {
            Some(states) if states.last() == Some(&step.from) => states.push(step.to.clone()),
            _ => chains.push(vec![step.from.clone(), step.to.clone()]),
        }
    }
    chains
}
