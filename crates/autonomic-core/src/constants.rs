/// Autonomic system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tier assigned to patterns mined directly from contexts.
pub const BASE_TIER: u32 = 0;

/// Highest tier the synthesizer will ever target.
pub const MAX_TIER: u32 = 16;

/// Separator used when flattening nested observation keys.
pub const PATH_SEPARATOR: char = '.';

/// Upper bound on exponential backoff doubling.
pub const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Longest duration any configured timeout may express (one hundred years).
pub const MAX_DURATION_SECS: u64 = 100 * 365 * 86_400;
