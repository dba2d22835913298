use serde::{Deserialize, Serialize};

/// How structural descriptions are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivalenceMode {
    /// Values must match exactly.
    #[default]
    Exact,
    /// Text is compared trimmed and case-folded; integral floats equal integers.
    Normalized,
}

/// Selects the structural comparison used by learner, validator, and store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalenceConfig {
    pub mode: EquivalenceMode,
    /// Treat containment (one description a subset of the other) as overlap.
    pub containment_overlap: bool,
}
