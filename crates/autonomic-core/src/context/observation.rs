//! Observation values and merge semantics.
//!
//! Merge is additive: new keys are inserted, existing keys are overwritten,
//! nested mappings are merged recursively. Nothing is ever removed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::PATH_SEPARATOR;

/// A key/value snapshot reported for one subject.
pub type Observation = BTreeMap<String, ObservationValue>;

/// Scalar or nested value in an observation. The schema is caller-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Map(BTreeMap<String, ObservationValue>),
}

/// Coarse kind used for strict-typing checks. Integers and floats are both numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Number,
    Text,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

impl ObservationValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ObservationValue::Bool(_) => ValueKind::Bool,
            ObservationValue::Integer(_) | ObservationValue::Float(_) => ValueKind::Number,
            ObservationValue::Text(_) => ValueKind::Text,
            ObservationValue::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, ObservationValue::Map(_))
    }

    /// Check that the value can be hashed and compared: floats must be finite
    /// and nested keys non-empty.
    pub fn check_well_formed(&self, path: &str) -> Result<(), String> {
        match self {
            ObservationValue::Float(f) if !f.is_finite() => {
                Err(format!("non-finite number at '{path}'"))
            }
            ObservationValue::Map(map) => {
                for (key, value) in map {
                    if key.is_empty() {
                        return Err(format!("empty key under '{path}'"));
                    }
                    value.check_well_formed(&join_path(path, key))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationValue::Bool(b) => write!(f, "{b}"),
            ObservationValue::Integer(i) => write!(f, "{i}"),
            ObservationValue::Float(x) => write!(f, "{x}"),
            ObservationValue::Text(s) => write!(f, "{s}"),
            ObservationValue::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for ObservationValue {
    fn from(v: bool) -> Self {
        ObservationValue::Bool(v)
    }
}

impl From<i64> for ObservationValue {
    fn from(v: i64) -> Self {
        ObservationValue::Integer(v)
    }
}

impl From<i32> for ObservationValue {
    fn from(v: i32) -> Self {
        ObservationValue::Integer(i64::from(v))
    }
}

impl From<f64> for ObservationValue {
    fn from(v: f64) -> Self {
        ObservationValue::Float(v)
    }
}

impl From<&str> for ObservationValue {
    fn from(v: &str) -> Self {
        ObservationValue::Text(v.to_string())
    }
}

impl From<String> for ObservationValue {
    fn from(v: String) -> Self {
        ObservationValue::Text(v)
    }
}

/// Check that every key and value in an observation is well formed.
pub fn check_well_formed(observation: &Observation) -> Result<(), String> {
    for (key, value) in observation {
        if key.is_empty() {
            return Err("empty observation key".to_string());
        }
        value.check_well_formed(key)?;
    }
    Ok(())
}

/// Check that merging `incoming` into `existing` keeps every key's value kind.
pub fn check_kinds_compatible(existing: &Observation, incoming: &Observation) -> Result<(), String> {
    check_kinds_at("", existing, incoming)
}

fn check_kinds_at(prefix: &str, existing: &Observation, incoming: &Observation) -> Result<(), String> {
    for (key, new_value) in incoming {
        let Some(old_value) = existing.get(key) else {
            continue;
        };
        let path = join_path(prefix, key);
        match (old_value, new_value) {
            (ObservationValue::Map(old), ObservationValue::Map(new)) => {
                check_kinds_at(&path, old, new)?;
            }
            (old, new) if old.kind() != new.kind() => {
                return Err(format!(
                    "type mismatch at '{path}': existing {} vs incoming {}",
                    old.kind(),
                    new.kind()
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Merge `incoming` into `target`. Nested maps merge recursively; any other
/// pairing overwrites.
pub fn merge_into(target: &mut Observation, incoming: Observation) {
    for (key, new_value) in incoming {
        match new_value {
            ObservationValue::Map(nested) => match target.get_mut(&key) {
                Some(ObservationValue::Map(existing)) => merge_into(existing, nested),
                _ => {
                    target.insert(key, ObservationValue::Map(nested));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

/// Flatten scalar leaves into dotted paths, sorted by path.
pub fn flatten(observation: &Observation) -> BTreeMap<String, ObservationValue> {
    let mut out = BTreeMap::new();
    flatten_into("", observation, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Observation, out: &mut BTreeMap<String, ObservationValue>) {
    for (key, value) in map {
        let path = join_path(prefix, key);
        match value {
            ObservationValue::Map(nested) => flatten_into(&path, nested, out),
            scalar => {
                out.insert(path, scalar.clone());
            }
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{key}")
    }
}
