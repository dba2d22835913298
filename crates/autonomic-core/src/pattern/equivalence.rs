//! Total, side-effect-free comparison of structural descriptions.

use std::collections::BTreeMap;

use super::structure::StructuralDescription;
use crate::config::{EquivalenceConfig, EquivalenceMode};
use crate::context::ObservationValue;
use crate::errors::AutonomicResult;

/// Equality and containment over structural descriptions.
///
/// Implementations must be pure: the same inputs always give the same answer.
pub trait StructuralEquivalence: Send + Sync {
    /// Representative form: two descriptions are equivalent iff their canonical
    /// forms are equal.
    fn canonicalize(&self, description: &StructuralDescription) -> StructuralDescription;

    fn equivalent(&self, a: &StructuralDescription, b: &StructuralDescription) -> bool {
        self.canonicalize(a) == self.canonicalize(b)
    }

    /// Whether `outer` contains every element of `inner`.
    fn contains(&self, outer: &StructuralDescription, inner: &StructuralDescription) -> bool;

    /// Whether two descriptions overlap for conflict purposes.
    fn overlaps(&self, a: &StructuralDescription, b: &StructuralDescription) -> bool;

    /// Tier-independent lookup key: equivalent descriptions share a key.
    fn canonical_key(&self, description: &StructuralDescription) -> AutonomicResult<String> {
        let body = self.canonicalize(description).canonical_json()?;
        Ok(blake3::hash(body.as_bytes()).to_hex().to_string())
    }

    /// True when `overlaps` never holds between non-equivalent descriptions,
    /// so a key lookup finds every overlap.
    fn overlap_is_equivalence(&self) -> bool {
        false
    }

    /// Names the key scheme. Stored keys are rebuilt when it changes; an
    /// empty scheme rebuilds them on every open.
    fn key_scheme(&self) -> String {
        String::new()
    }
}

/// Configurable equivalence: exact or normalized values, with optional
/// containment counted as overlap.
#[derive(Debug, Clone, Default)]
pub struct CanonicalEquivalence {
    mode: EquivalenceMode,
    containment_overlap: bool,
}

impl CanonicalEquivalence {
    pub fn new(mode: EquivalenceMode, containment_overlap: bool) -> Self {
        Self {
            mode,
            containment_overlap,
        }
    }

    pub fn from_config(config: &EquivalenceConfig) -> Self {
        Self::new(config.mode, config.containment_overlap)
    }

    fn normalize_value(&self, value: &ObservationValue) -> ObservationValue {
        if self.mode == EquivalenceMode::Exact {
            return value.clone();
        }
        match value {
            ObservationValue::Text(s) => ObservationValue::Text(s.trim().to_lowercase()),
            ObservationValue::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 =>
            {
                ObservationValue::Integer(*f as i64)
            }
            ObservationValue::Map(map) => ObservationValue::Map(self.normalize_map(map)),
            other => other.clone(),
        }
    }

    fn normalize_key(&self, key: &str) -> String {
        match self.mode {
            EquivalenceMode::Exact => key.to_string(),
            EquivalenceMode::Normalized => key.trim().to_lowercase(),
        }
    }

    fn normalize_map(
        &self,
        map: &BTreeMap<String, ObservationValue>,
    ) -> BTreeMap<String, ObservationValue> {
        map.iter()
            .map(|(k, v)| (self.normalize_key(k), self.normalize_value(v)))
            .collect()
    }
}

impl StructuralEquivalence for CanonicalEquivalence {
    fn canonicalize(&self, description: &StructuralDescription) -> StructuralDescription {
        match description {
            StructuralDescription::CoOccurrence { attributes } => {
                StructuralDescription::CoOccurrence {
                    attributes: self.normalize_map(attributes),
                }
            }
            StructuralDescription::Transition { key, from, to } => {
                StructuralDescription::Transition {
                    key: self.normalize_key(key),
                    from: self.normalize_value(from),
                    to: self.normalize_value(to),
                }
            }
            StructuralDescription::Sequence { key, states } => StructuralDescription::Sequence {
                key: self.normalize_key(key),
                states: states.iter().map(|s| self.normalize_value(s)).collect(),
            },
            StructuralDescription::Composite { members } => {
                StructuralDescription::composite(members.iter().cloned())
            }
        }
    }

    fn contains(&self, outer: &StructuralDescription, inner: &StructuralDescription) -> bool {
        match (self.canonicalize(outer), self.canonicalize(inner)) {
            (
                StructuralDescription::CoOccurrence { attributes: outer },
                StructuralDescription::CoOccurrence { attributes: inner },
            ) => inner.iter().all(|(k, v)| outer.get(k) == Some(v)),
            (
                StructuralDescription::Composite { members: outer },
                StructuralDescription::Composite { members: inner },
            ) => inner.iter().all(|m| outer.binary_search(m).is_ok()),
            (
                StructuralDescription::Sequence { key: outer_key, states: outer },
                StructuralDescription::Sequence { key: inner_key, states: inner },
            ) => {
                outer_key == inner_key
                    && !inner.is_empty()
                    && outer.windows(inner.len()).any(|run| run == inner.as_slice())
            }
            (a @ StructuralDescription::Transition { .. }, b) => a == b,
            _ => false,
        }
    }

    fn overlaps(&self, a: &StructuralDescription, b: &StructuralDescription) -> bool {
        if self.equivalent(a, b) {
            return true;
        }
        self.containment_overlap && (self.contains(a, b) || self.contains(b, a))
    }

    fn overlap_is_equivalence(&self) -> bool {
        !self.containment_overlap
    }

    fn key_scheme(&self) -> String {
        match self.mode {
            EquivalenceMode::Exact => "canonical/exact".to_string(),
            EquivalenceMode::Normalized => "canonical/normalized".to_string(),
        }
    }
}
