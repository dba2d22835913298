//! Structural descriptions: the matched regularity behind a pattern.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::pattern::PatternId;
use crate::context::ObservationValue;

/// What a pattern matched. Opaque to the pipeline beyond the comparisons a
/// [`super::StructuralEquivalence`] provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralDescription {
    /// Flattened key/value pairs observed together in one context.
    CoOccurrence {
        attributes: BTreeMap<String, ObservationValue>,
    },
    /// A scalar value changing from one value to another on one key.
    Transition {
        key: String,
        from: ObservationValue,
        to: ObservationValue,
    },
    /// Consecutive transitions on one key: each state changes into the next.
    /// Always holds at least three states.
    Sequence {
        key: String,
        states: Vec<ObservationValue>,
    },
    /// Lower-tier patterns that hold together. Members are sorted and unique.
    Composite { members: Vec<PatternId> },
}

impl StructuralDescription {
    /// Build a composite with sorted, deduplicated members.
    pub fn composite(members: impl IntoIterator<Item = PatternId>) -> Self {
        let mut members: Vec<PatternId> = members.into_iter().collect();
        members.sort();
        members.dedup();
        StructuralDescription::Composite { members }
    }

    /// Build a co-occurrence description from key/value pairs.
    pub fn co_occurrence<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ObservationValue>,
    {
        StructuralDescription::CoOccurrence {
            attributes: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Stable name of the variant, used as the store's coarse index.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StructuralDescription::CoOccurrence { .. } => "co_occurrence",
            StructuralDescription::Transition { .. } => "transition",
            StructuralDescription::Sequence { .. } => "sequence",
            StructuralDescription::Composite { .. } => "composite",
        }
    }

    /// Canonical JSON: maps are ordered, composites are sorted.
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Pattern ids this description refers to.
    pub fn member_ids(&self) -> &[PatternId] {
        match self {
            StructuralDescription::Composite { members } => members,
            _ => &[],
        }
    }
}

impl fmt::Display for StructuralDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralDescription::CoOccurrence { attributes } => {
                let parts: Vec<String> = attributes
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                write!(f, "co-occurrence [{}]", parts.join(", "))
            }
            StructuralDescription::Transition { key, from, to } => {
                write!(f, "transition {key}: {from} -> {to}")
            }
            StructuralDescription::Sequence { key, states } => {
                let parts: Vec<String> = states.iter().map(|s| s.to_string()).collect();
                write!(f, "sequence {key}: {}", parts.join(" -> "))
            }
            StructuralDescription::Composite { members } => {
                let parts: Vec<String> = members.iter().map(|m| m.short()).collect();
                write!(f, "composite of [{}]", parts.join(", "))
            }
        }
    }
}
