//! Per-context extraction of structural descriptions.

pub mod itemsets;
pub mod transitions;

use std::collections::BTreeMap;

use autonomic_core::config::LearningConfig;
use autonomic_core::context::observation::flatten;
use autonomic_core::pattern::StructuralEquivalence;
use autonomic_core::{Context, ObservationValue, StructuralDescription};

/// Everything one context contributes, in canonical form. A description
/// appears at most once per context.
pub fn extract(
    context: &Context,
    config: &LearningConfig,
    equivalence: &dyn StructuralEquivalence,
) -> Vec<StructuralDescription> {
    let attributes = minable_attributes(context, config);
    let mut found = itemsets::co_occurrences(&attributes, config);
    if config.mine_transitions {
        found.extend(transitions::repeated_transitions(context, config));
        found.extend(transitions::repeated_sequences(context, config));
    }

    let mut canonical: Vec<StructuralDescription> =
        found.iter().map(|d| equivalence.canonicalize(d)).collect();
    canonical.sort_by_cached_key(|d| d.canonical_json().unwrap_or_default());
    canonical.dedup();
    canonical
}

/// Flattened scalar attributes with ignored keys removed.
pub fn minable_attributes(
    context: &Context,
    config: &LearningConfig,
) -> BTreeMap<String, ObservationValue> {
    flatten(&context.state)
        .into_iter()
        .filter(|(key, _)| !is_ignored(key, &config.ignored_keys))
        .collect()
}

/// A key is ignored if it, or any parent path of it, is listed.
pub fn is_ignored(key: &str, ignored: &[String]) -> bool {
    ignored.iter().any(|prefix| {
        key == prefix
            || (key.starts_with(prefix.as_str())
                && key[prefix.len()..].starts_with(autonomic_core::constants::PATH_SEPARATOR))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_matches_whole_path_segments() {
        let ignored = vec!["request".to_string()];
        assert!(is_ignored("request", &ignored));
        assert!(is_ignored("request.id", &ignored));
        assert!(!is_ignored("requests", &ignored));
        assert!(!is_ignored("event", &ignored));
    }
}
