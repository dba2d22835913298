use autonomic_core::config::{defaults, ConflictRule, EquivalenceMode};
use autonomic_core::constants::MAX_DURATION_SECS;
use autonomic_core::{AutonomicConfig, AutonomicError};

#[test]
fn empty_toml_yields_defaults() {
    let config = AutonomicConfig::from_toml("").unwrap();
    assert_eq!(config.validation.min_evidence, defaults::DEFAULT_MIN_EVIDENCE);
    assert_eq!(config.validation.conflict_rule, ConflictRule::Reject);
    assert_eq!(config.context.idle_timeout_secs, defaults::DEFAULT_IDLE_TIMEOUT_SECS);
    assert_eq!(config.synthesis.tiers(), vec![1]);
    assert_eq!(config.equivalence.mode, EquivalenceMode::Exact);
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let config = AutonomicConfig::from_toml(
        r#"
        [validation]
        conflict_rule = "supersede"
        min_confidence = 0.6

        [application]
        min_confidence = 0.9

        [synthesis]
        enabled_tiers = [2, 1, 1, 0]

        [equivalence]
        mode = "normalized"
        "#,
    )
    .unwrap();
    assert_eq!(config.validation.conflict_rule, ConflictRule::Supersede);
    assert!((config.validation.min_confidence - 0.6).abs() < f64::EPSILON);
    assert_eq!(config.validation.min_evidence, defaults::DEFAULT_MIN_EVIDENCE);
    assert_eq!(config.synthesis.tiers(), vec![1, 2]);
    assert_eq!(config.equivalence.mode, EquivalenceMode::Normalized);
}

#[test]
fn application_threshold_must_be_stricter() {
    let err = AutonomicConfig::from_toml(
        r#"
        [validation]
        min_confidence = 0.7
        [application]
        min_confidence = 0.6
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, AutonomicError::ConfigError { .. }));
}

#[test]
fn application_thresholds_equal_to_validation_are_rejected() {
    let mut config = AutonomicConfig::default();
    config.application.min_confidence = config.validation.min_confidence;
    config.application.min_evidence = config.validation.min_evidence;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("raise"));

    // Raising either threshold alone is enough.
    config.application.min_evidence += 1;
    assert!(config.validate().is_ok());
    config.application.min_evidence = config.validation.min_evidence;
    config.application.min_confidence = 0.9;
    assert!(config.validate().is_ok());
}

#[test]
fn durations_beyond_a_century_are_rejected() {
    for field in ["idle_after", "idle_timeout", "max_age", "cadence"] {
        let mut config = AutonomicConfig::default();
        match field {
            "idle_after" => {
                config.context.idle_after_secs = u64::MAX;
                config.context.idle_timeout_secs = u64::MAX;
            }
            "idle_timeout" => config.context.idle_timeout_secs = MAX_DURATION_SECS + 1,
            "max_age" => config.validation.max_candidate_age_secs = u64::MAX,
            _ => config.manager.cadence_secs = u64::MAX,
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"), "{field}: {err}");
    }

    let mut config = AutonomicConfig::default();
    config.context.idle_timeout_secs = MAX_DURATION_SECS;
    assert!(config.validate().is_ok());
}

#[test]
fn oversized_durations_saturate_instead_of_overflowing() {
    let mut config = AutonomicConfig::default();
    config.context.idle_timeout_secs = u64::MAX;
    config.validation.max_candidate_age_secs = u64::MAX;
    assert_eq!(config.context.idle_timeout(), chrono::Duration::MAX);
    assert_eq!(config.validation.max_candidate_age(), chrono::Duration::MAX);
    assert_eq!(
        config.context.idle_after(),
        chrono::Duration::seconds(defaults::DEFAULT_IDLE_AFTER_SECS as i64)
    );
}

#[test]
fn singleton_patterns_cannot_be_configured() {
    let mut config = AutonomicConfig::default();
    config.learning.min_occurrences = 1;
    assert!(config.validate().is_err());
}

#[test]
fn zero_cadence_rejected() {
    let mut config = AutonomicConfig::default();
    config.manager.cadence_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn malformed_toml_is_config_error() {
    let err = AutonomicConfig::from_toml("[validation\nmin_confidence = ").unwrap_err();
    assert!(err.to_string().contains("invalid TOML"));
}

#[test]
fn toml_roundtrip_preserves_policy() {
    let mut config = AutonomicConfig::default();
    config.validation.conflict_rule = ConflictRule::Supersede;
    config.learning.ignored_keys = vec!["request_id".to_string()];
    let text = config.to_toml().unwrap();
    let back = AutonomicConfig::from_toml(&text).unwrap();
    assert_eq!(back.validation.conflict_rule, ConflictRule::Supersede);
    assert_eq!(back.learning.ignored_keys, vec!["request_id".to_string()]);
}
