//! Tracing setup: structured logging with span definitions and event functions.

pub mod events;
pub mod spans;

use tracing_subscriber::EnvFilter;

use autonomic_core::config::ObservabilityConfig;

/// Environment variable holding the filter directive.
pub const LOG_ENV_VAR: &str = "AUTONOMIC_LOG";

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects `AUTONOMIC_LOG`; defaults to `info`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .init();
}

/// Initialize tracing with a custom filter string (for testing or embedding).
/// Returns false if a global subscriber is already installed.
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init()
        .is_ok()
}

/// Initialize from the observability config section. `AUTONOMIC_LOG`
/// still wins over `log_level` when set.
pub fn init_from_config(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
