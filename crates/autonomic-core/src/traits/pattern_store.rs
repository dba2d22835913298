use chrono::{DateTime, Utc};

use crate::errors::AutonomicResult;
use crate::models::StoreStats;
use crate::pattern::{Pattern, PatternId, StructuralDescription};

/// Durable repository of judged patterns.
///
/// Every write is atomic per pattern id. Readers never wait on more than a
/// single record update.
pub trait IPatternStore: Send + Sync {
    /// Insert or reinforce. Re-storing an existing id sums evidence, keeps the
    /// higher confidence, and unions provenance; it never duplicates the record.
    /// Returns the stored record.
    fn put(&self, pattern: &Pattern) -> AutonomicResult<Pattern>;

    /// Point lookup. `None` means not found.
    fn get(&self, id: &PatternId) -> AutonomicResult<Option<Pattern>>;

    /// Every stored pattern whose description overlaps `description`, any status.
    fn find_overlapping(&self, description: &StructuralDescription)
        -> AutonomicResult<Vec<Pattern>>;

    /// Accepted patterns with `min_tier <= tier <= max_tier`, ordered by tier then id.
    fn list_accepted(&self, min_tier: u32, max_tier: u32) -> AutonomicResult<Vec<Pattern>>;

    /// Store `pattern` as accepted and mark each of `superseded` as superseded
    /// by it, all in one transaction.
    fn accept_superseding(
        &self,
        pattern: &Pattern,
        superseded: &[PatternId],
    ) -> AutonomicResult<Pattern>;

    /// Accepted patterns never handed to the applier whose stored confidence
    /// and evidence meet both minimums, ordered by id.
    fn list_unproposed(&self, min_confidence: f64, min_evidence: u64)
        -> AutonomicResult<Vec<Pattern>>;

    /// Record that `ids` were handed to the applier. Ids already marked keep
    /// their first timestamp. Returns how many records changed.
    fn mark_proposed(&self, ids: &[PatternId], at: DateTime<Utc>) -> AutonomicResult<usize>;

    /// Record counts per status.
    fn stats(&self) -> AutonomicResult<StoreStats>;
}
