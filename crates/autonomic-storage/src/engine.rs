//! StorageEngine: owns the ConnectionPool and implements IPatternStore.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use autonomic_core::config::StorageConfig;
use autonomic_core::errors::AutonomicResult;
use autonomic_core::models::StoreStats;
use autonomic_core::pattern::StructuralEquivalence;
use autonomic_core::traits::IPatternStore;
use autonomic_core::{Pattern, PatternId, PatternStatus, StructuralDescription};

use crate::audit::{AuditEntry, AuditLogger};
use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{pattern_crud, pattern_query};
use crate::to_storage_err;

const KEY_SCHEME: &str = "key_scheme";

/// SQLite-backed pattern store.
///
/// Each record carries a tier-independent canonical key computed with the
/// store's equivalence. Overlap lookups use that index whenever overlap
/// reduces to equivalence, and scan the description kind otherwise.
pub struct StorageEngine {
    pool: ConnectionPool,
    equivalence: Arc<dyn StructuralEquivalence>,
}

impl StorageEngine {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path, equivalence: Arc<dyn StructuralEquivalence>) -> AutonomicResult<Self> {
        Self::open_with_pool_size(path, 4, equivalence)
    }

    pub fn open_with_pool_size(
        path: &Path,
        read_pool_size: usize,
        equivalence: Arc<dyn StructuralEquivalence>,
    ) -> AutonomicResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let engine = Self {
            pool,
            equivalence,
        };
        engine.initialize()?;
        info!(path = %path.display(), "pattern store opened");
        Ok(engine)
    }

    /// Open from the storage section of the configuration.
    pub fn from_config(
        config: &StorageConfig,
        equivalence: Arc<dyn StructuralEquivalence>,
    ) -> AutonomicResult<Self> {
        Self::open_with_pool_size(Path::new(&config.db_path), config.read_pool_size, equivalence)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory(equivalence: Arc<dyn StructuralEquivalence>) -> AutonomicResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self {
            pool,
            equivalence,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> AutonomicResult<()> {
        let version = self.pool.with_writer(migrations::run_migrations)?;
        debug!(schema_version = version, "migrations complete");
        self.refresh_canonical_keys()
    }

    /// Recompute every canonical key when the equivalence's key scheme
    /// differs from the one the keys were written with.
    fn refresh_canonical_keys(&self) -> AutonomicResult<()> {
        let scheme = self.equivalence.key_scheme();
        let recorded = self
            .pool
            .with_writer(|conn| pattern_query::meta_value(conn, KEY_SCHEME))?;
        if !scheme.is_empty() && recorded.as_deref() == Some(scheme.as_str()) {
            return Ok(());
        }

        let records = self.pool.with_writer(pattern_query::all_descriptions)?;
        let keyed = records
            .into_iter()
            .map(|(id, description)| Ok((id, self.equivalence.canonical_key(&description)?)))
            .collect::<AutonomicResult<Vec<_>>>()?;
        self.pool.with_writer(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("rekey begin: {e}")))?;
            for (id, key) in &keyed {
                pattern_crud::set_canonical_key(&tx, id, key)?;
            }
            pattern_query::set_meta_value(&tx, KEY_SCHEME, &scheme)?;
            tx.commit()
                .map_err(|e| to_storage_err(format!("rekey commit: {e}")))
        })?;
        info!(records = keyed.len(), scheme = %scheme, "canonical keys rebuilt");
        Ok(())
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Current schema version.
    pub fn schema_version(&self) -> AutonomicResult<u32> {
        self.pool.with_writer(migrations::current_version)
    }

    /// Audit rows recorded for one pattern, oldest first.
    pub fn audit_trail(&self, id: &PatternId) -> AutonomicResult<Vec<AuditEntry>> {
        self.pool.with_reader(|conn| AuditLogger::trail(conn, id))
    }
}

impl IPatternStore for StorageEngine {
    fn put(&self, pattern: &Pattern) -> AutonomicResult<Pattern> {
        let key = self.equivalence.canonical_key(&pattern.description)?;
        let stored = self
            .pool
            .with_writer(|conn| pattern_crud::upsert_pattern(conn, pattern, &key))?;
        debug!(
            pattern_id = %pattern.id.short(),
            status = %stored.status,
            evidence_count = stored.evidence_count,
            "pattern stored"
        );
        Ok(stored)
    }

    fn get(&self, id: &PatternId) -> AutonomicResult<Option<Pattern>> {
        self.pool.with_reader(|conn| pattern_crud::get_pattern(conn, id))
    }

    fn find_overlapping(
        &self,
        description: &StructuralDescription,
    ) -> AutonomicResult<Vec<Pattern>> {
        let candidates = if self.equivalence.overlap_is_equivalence() {
            let key = self.equivalence.canonical_key(description)?;
            self.pool.with_reader(|conn| pattern_query::by_canonical_key(conn, &key))?
        } else {
            self.pool.with_reader(|conn| pattern_query::by_kind(conn, description.kind_name()))?
        };
        Ok(candidates
            .into_iter()
            .filter(|p| self.equivalence.overlaps(&p.description, description))
            .collect())
    }

    fn list_accepted(&self, min_tier: u32, max_tier: u32) -> AutonomicResult<Vec<Pattern>> {
        if min_tier > max_tier {
            return Ok(Vec::new());
        }
        self.pool.with_reader(|conn| pattern_query::list_accepted(conn, min_tier, max_tier))
    }

    fn accept_superseding(
        &self,
        pattern: &Pattern,
        superseded: &[PatternId],
    ) -> AutonomicResult<Pattern> {
        let mut accepted = pattern.clone();
        accepted.status = PatternStatus::Accepted;
        accepted.rejection_reason = None;

        let key = self.equivalence.canonical_key(&accepted.description)?;
        let stored = self.pool.with_writer(|conn| {
            pattern_crud::accept_superseding(conn, &accepted, &key, superseded)
        })?;
        info!(
            pattern_id = %stored.id.short(),
            superseded = superseded.len(),
            "pattern accepted over prior patterns"
        );
        Ok(stored)
    }

    fn list_unproposed(
        &self,
        min_confidence: f64,
        min_evidence: u64,
    ) -> AutonomicResult<Vec<Pattern>> {
        self.pool
            .with_reader(|conn| pattern_query::list_unproposed(conn, min_confidence, min_evidence))
    }

    fn mark_proposed(&self, ids: &[PatternId], at: DateTime<Utc>) -> AutonomicResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let changed = self
            .pool
            .with_writer(|conn| pattern_crud::mark_proposed(conn, ids, at))?;
        debug!(requested = ids.len(), changed, "patterns marked proposed");
        Ok(changed)
    }

    fn stats(&self) -> AutonomicResult<StoreStats> {
        self.pool.with_reader(pattern_query::stats)
    }
}
