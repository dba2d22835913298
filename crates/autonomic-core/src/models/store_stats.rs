use serde::{Deserialize, Serialize};

/// Record counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub superseded: usize,
}

impl StoreStats {
    pub fn total(&self) -> usize {
        self.pending + self.accepted + self.rejected + self.superseded
    }
}
