//! Provenance DAG checks on synthesized candidates.

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use autonomic_core::errors::SynthesisError;
use autonomic_core::Pattern;

/// Check a candidate against the known patterns: non-empty provenance,
/// tier strictly above every contributor, and no provenance cycle through it.
pub fn check_candidate(
    candidate: &Pattern,
    known: &HashMap<&str, &Pattern>,
) -> Result<(), SynthesisError> {
    if candidate.provenance.is_empty() {
        return Err(SynthesisError::EmptyProvenance {
            pattern_id: candidate.id.to_string(),
        });
    }

    for source in &candidate.provenance {
        if let Some(contributor) = known.get(source.as_str()) {
            if contributor.tier >= candidate.tier {
                return Err(SynthesisError::TierViolation {
                    pattern_id: candidate.id.to_string(),
                    tier: candidate.tier,
                    contributor: source.clone(),
                    contributor_tier: contributor.tier,
                });
            }
        }
    }

    let graph = provenance_graph(candidate, known);
    if let Some(cycle) = cycle_through(&graph, candidate.id.as_str()) {
        return Err(SynthesisError::ProvenanceCycle {
            pattern_id: candidate.id.to_string(),
            path: cycle.join(" -> "),
        });
    }
    Ok(())
}

/// Edges point from a pattern to each pattern in its provenance. Tier-0
/// provenance (context ids) is not part of the graph.
fn provenance_graph<'a>(
    candidate: &'a Pattern,
    known: &HashMap<&'a str, &'a Pattern>,
) -> DiGraphMap<&'a str, ()> {
    let mut graph = DiGraphMap::new();
    let mut expanded: HashSet<&'a str> = HashSet::new();
    let mut stack: Vec<&'a Pattern> = vec![candidate];
    while let Some(pattern) = stack.pop() {
        if !expanded.insert(pattern.id.as_str()) {
            continue;
        }
        graph.add_node(pattern.id.as_str());
        if pattern.is_base_tier() {
            continue;
        }
        for source in &pattern.provenance {
            let target: &'a Pattern = match known.get(source.as_str()) {
                Some(p) => *p,
                None if source == candidate.id.as_str() => candidate,
                None => continue,
            };
            graph.add_edge(pattern.id.as_str(), target.id.as_str(), ());
            stack.push(target);
        }
    }
    graph
}

/// Nodes of a strongly connected component containing `id`, if it is a cycle.
fn cycle_through<'a>(graph: &DiGraphMap<&'a str, ()>, id: &str) -> Option<Vec<&'a str>> {
    tarjan_scc(graph).into_iter().find_map(|scc| {
        let contains = scc.iter().any(|n| *n == id);
        let is_cycle = scc.len() > 1 || scc.first().is_some_and(|n| graph.contains_edge(*n, *n));
        (contains && is_cycle).then(|| {
            let mut nodes = scc;
            nodes.sort_unstable();
            nodes
        })
    })
}
