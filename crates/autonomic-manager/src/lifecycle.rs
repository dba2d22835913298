//! Control-loop stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an iteration is. `Idle` between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LoopStage {
    Idle = 0,
    Observing = 1,
    Learning = 2,
    Synthesizing = 3,
    Validating = 4,
    Storing = 5,
    Acting = 6,
}

impl LoopStage {
    /// Stages of one iteration, in execution order.
    pub const PIPELINE: [LoopStage; 6] = [
        LoopStage::Observing,
        LoopStage::Learning,
        LoopStage::Synthesizing,
        LoopStage::Validating,
        LoopStage::Storing,
        LoopStage::Acting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoopStage::Idle => "idle",
            LoopStage::Observing => "observing",
            LoopStage::Learning => "learning",
            LoopStage::Synthesizing => "synthesizing",
            LoopStage::Validating => "validating",
            LoopStage::Storing => "storing",
            LoopStage::Acting => "acting",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => LoopStage::Observing,
            2 => LoopStage::Learning,
            3 => LoopStage::Synthesizing,
            4 => LoopStage::Validating,
            5 => LoopStage::Storing,
            6 => LoopStage::Acting,
            _ => LoopStage::Idle,
        }
    }

    /// Parse a stage name as produced by [`Self::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        std::iter::once(LoopStage::Idle)
            .chain(Self::PIPELINE)
            .find(|s| s.as_str() == name)
    }
}

impl fmt::Display for LoopStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
