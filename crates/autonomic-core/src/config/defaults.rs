// Single source of truth for all default values.

// --- Context ---
pub const DEFAULT_IDLE_AFTER_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 900; // 15 minutes
pub const DEFAULT_STRICT_TYPES: bool = false;
pub const DEFAULT_MAX_TRANSITIONS: usize = 64;
pub const DEFAULT_MAX_PENDING_FINAL_SNAPSHOTS: usize = 1_024;

// --- Learning ---
pub const DEFAULT_MIN_OCCURRENCES: u64 = 2;
pub const DEFAULT_MAX_ITEMSET_SIZE: usize = 2;
pub const DEFAULT_MAX_ATTRIBUTES_PER_CONTEXT: usize = 32;
pub const DEFAULT_PRIOR_WEIGHT: f64 = 1.0;
pub const DEFAULT_MINE_TRANSITIONS: bool = true;
pub const DEFAULT_MAX_SEQUENCE_STEPS: usize = 3;

// --- Synthesis ---
pub const DEFAULT_SYNTHESIS_TIERS: &[u32] = &[1];
pub const DEFAULT_MIN_SHARED_SUPPORT: usize = 2;
pub const DEFAULT_MIN_JACCARD: f64 = 0.5;
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;
pub const DEFAULT_MAX_GROUP_SIZE: usize = 8;

// --- Validation ---
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_MIN_EVIDENCE: u64 = 2;
pub const DEFAULT_MAX_CANDIDATE_AGE_SECS: u64 = 86_400; // 1 day

// --- Application ---
pub const DEFAULT_APPLY_MIN_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_APPLY_MIN_EVIDENCE: u64 = 3;

// --- Manager ---
pub const DEFAULT_CADENCE_SECS: u64 = 60;
pub const DEFAULT_MAX_STORE_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 100;
pub const DEFAULT_MAX_BACKOFF_TICKS: u32 = 8;
pub const DEFAULT_HISTORY_LEN: usize = 32;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "autonomic.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
