//! Pattern: a learned regularity, tiered by derivation order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::structure::StructuralDescription;
use crate::constants::BASE_TIER;
use crate::errors::{AutonomicError, AutonomicResult};

/// Content-derived pattern identifier: blake3 over tier and canonical description.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(pub String);

impl PatternId {
    /// Derive the identifier for a description at a tier. Identical bodies
    /// always give identical ids, so no coordination is needed between learners.
    pub fn derive(description: &StructuralDescription, tier: u32) -> AutonomicResult<Self> {
        let body = description.canonical_json()?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(&tier.to_le_bytes());
        hasher.update(body.as_bytes());
        Ok(Self(hasher.finalize().to_hex().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for log lines.
    pub fn short(&self) -> String {
        self.0.chars().take(12).collect()
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PatternId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Validation status. Only the validator moves a pattern out of `Pending`;
/// `Superseded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Pending,
    Accepted,
    Rejected,
    Superseded,
}

impl PatternStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternStatus::Pending => "pending",
            PatternStatus::Accepted => "accepted",
            PatternStatus::Rejected => "rejected",
            PatternStatus::Superseded => "superseded",
        }
    }
}

impl fmt::Display for PatternStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternStatus {
    type Err = AutonomicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PatternStatus::Pending),
            "accepted" => Ok(PatternStatus::Accepted),
            "rejected" => Ok(PatternStatus::Rejected),
            "superseded" => Ok(PatternStatus::Superseded),
            other => Err(AutonomicError::config(format!("unknown pattern status '{other}'"))),
        }
    }
}

/// Why the validator rejected a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    LowConfidence { confidence: f64, threshold: f64 },
    InsufficientEvidence { evidence: u64, required: u64 },
    Conflict { with: Vec<PatternId> },
    Expired { age_secs: i64, max_age_secs: u64 },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::LowConfidence { confidence, threshold } => {
                write!(f, "confidence {confidence:.3} below {threshold:.3}")
            }
            RejectionReason::InsufficientEvidence { evidence, required } => {
                write!(f, "evidence {evidence} below {required}")
            }
            RejectionReason::Conflict { with } => {
                let ids: Vec<String> = with.iter().map(|id| id.short()).collect();
                write!(f, "conflicts with [{}]", ids.join(", "))
            }
            RejectionReason::Expired { age_secs, max_age_secs } => {
                write!(f, "candidate age {age_secs}s exceeds {max_age_secs}s")
            }
        }
    }
}

/// A learned regularity.
///
/// Invariants: `tier` is strictly greater than the tier of every pattern in
/// `provenance`; tier-0 provenance lists context ids. Records are never
/// deleted, only superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    pub tier: u32,
    pub description: StructuralDescription,
    pub confidence: Confidence,
    /// Number of independent contexts or patterns supporting this one.
    pub evidence_count: u64,
    /// Ordered source identifiers: context ids at tier 0, pattern ids above.
    pub provenance: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: PatternStatus,
    pub superseded_by: Option<PatternId>,
    pub rejection_reason: Option<RejectionReason>,
}

impl Pattern {
    /// Build a pending candidate; the id is derived from description and tier.
    pub fn candidate(
        description: StructuralDescription,
        tier: u32,
        confidence: Confidence,
        evidence_count: u64,
        provenance: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> AutonomicResult<Self> {
        let id = PatternId::derive(&description, tier)?;
        Ok(Self {
            id,
            tier,
            description,
            confidence,
            evidence_count,
            provenance,
            created_at,
            status: PatternStatus::Pending,
            superseded_by: None,
            rejection_reason: None,
        })
    }

    pub fn is_base_tier(&self) -> bool {
        self.tier == BASE_TIER
    }

    pub fn is_accepted(&self) -> bool {
        self.status == PatternStatus::Accepted
    }

    /// Provenance entries interpreted as pattern ids (empty at tier 0).
    pub fn source_pattern_ids(&self) -> Vec<PatternId> {
        if self.is_base_tier() {
            return Vec::new();
        }
        self.provenance.iter().map(|s| PatternId(s.clone())).collect()
    }
}
