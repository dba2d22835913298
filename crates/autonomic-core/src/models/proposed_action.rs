use serde::{Deserialize, Serialize};

use crate::pattern::PatternId;

/// Envelope delivered to the external applier. The action vocabulary is the
/// applier's business; the pipeline only fills in this envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub pattern_id: PatternId,
    pub action_description: String,
    pub confidence: f64,
    pub evidence_count: u64,
    pub tier: u32,
}
