pub mod application_policy;
pub mod context_config;
pub mod defaults;
pub mod equivalence_config;
pub mod learning_config;
pub mod manager_config;
pub mod observability_config;
pub mod storage_config;
pub mod synthesis_config;
pub mod validation_policy;

pub use application_policy::ApplicationPolicy;
pub use context_config::ContextConfig;
pub use equivalence_config::{EquivalenceConfig, EquivalenceMode};
pub use learning_config::LearningConfig;
pub use manager_config::ManagerConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;
pub use synthesis_config::SynthesisConfig;
pub use validation_policy::{ConflictRule, ValidationPolicy};

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_DURATION_SECS, MAX_TIER};
use crate::errors::{AutonomicError, AutonomicResult};

/// Whole seconds as a signed duration, clamped to the largest representable
/// span instead of overflowing.
pub(crate) fn saturating_seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

/// Top-level configuration. Each section is handed to its component's
/// constructor; nothing reads configuration from process-wide state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonomicConfig {
    pub context: ContextConfig,
    pub learning: LearningConfig,
    pub synthesis: SynthesisConfig,
    pub validation: ValidationPolicy,
    pub application: ApplicationPolicy,
    pub equivalence: EquivalenceConfig,
    pub manager: ManagerConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl AutonomicConfig {
    /// Parse from a TOML string, then validate.
    pub fn from_toml(toml_str: &str) -> AutonomicResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| AutonomicError::config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> AutonomicResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AutonomicError::config(format!("cannot serialize config: {e}")))
    }

    /// Reject unsatisfiable or contradictory settings.
    pub fn validate(&self) -> AutonomicResult<()> {
        let v = &self.validation;
        let a = &self.application;

        for (name, value) in [
            ("validation.min_confidence", v.min_confidence),
            ("application.min_confidence", a.min_confidence),
            ("synthesis.min_jaccard", self.synthesis.min_jaccard),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AutonomicError::config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if a.min_confidence < v.min_confidence || a.min_evidence < v.min_evidence {
            return Err(AutonomicError::config(
                "application thresholds must be at least as strict as validation thresholds",
            ));
        }
        if a.min_confidence <= v.min_confidence && a.min_evidence <= v.min_evidence {
            return Err(AutonomicError::config(
                "application must raise min_confidence or min_evidence above validation",
            ));
        }
        if self.learning.min_occurrences < 2 {
            return Err(AutonomicError::config(
                "learning.min_occurrences must be at least 2",
            ));
        }
        if self.learning.max_itemset_size == 0 {
            return Err(AutonomicError::config(
                "learning.max_itemset_size must be at least 1",
            ));
        }
        if self.learning.prior_weight <= 0.0 {
            return Err(AutonomicError::config("learning.prior_weight must be positive"));
        }
        for (name, value) in [
            ("context.idle_after_secs", self.context.idle_after_secs),
            ("context.idle_timeout_secs", self.context.idle_timeout_secs),
            ("validation.max_candidate_age_secs", v.max_candidate_age_secs),
            ("manager.cadence_secs", self.manager.cadence_secs),
        ] {
            if value > MAX_DURATION_SECS {
                return Err(AutonomicError::config(format!(
                    "{name} must not exceed {MAX_DURATION_SECS}, got {value}"
                )));
            }
        }
        if self.context.idle_after_secs > self.context.idle_timeout_secs {
            return Err(AutonomicError::config(
                "context.idle_after_secs cannot exceed context.idle_timeout_secs",
            ));
        }
        if let Some(tier) = self.synthesis.enabled_tiers.iter().find(|t| **t > MAX_TIER) {
            return Err(AutonomicError::config(format!(
                "synthesis tier {tier} exceeds maximum tier {MAX_TIER}"
            )));
        }
        if self.synthesis.min_group_size < 2
            || self.synthesis.max_group_size < self.synthesis.min_group_size
        {
            return Err(AutonomicError::config(
                "synthesis group size bounds must satisfy 2 <= min_group_size <= max_group_size",
            ));
        }
        if self.manager.cadence_secs == 0 {
            return Err(AutonomicError::config("manager.cadence_secs must be non-zero"));
        }
        Ok(())
    }
}
