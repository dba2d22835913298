//! Insert, merge, get, and supersede single pattern records.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use autonomic_core::errors::{AutonomicError, AutonomicResult, StorageError};
use autonomic_core::{
    Confidence, Pattern, PatternId, PatternStatus, RejectionReason, StructuralDescription,
};

use crate::audit::{AuditLogger, AuditOperation};
use crate::to_storage_err;

pub(crate) const PATTERN_COLUMNS: &str = "id, tier, kind, description, confidence, evidence_count, \
     provenance, status, created_at, superseded_by, rejection_reason";

/// Fold an incoming write into an existing record.
///
/// Evidence is summed, confidence keeps the maximum, provenance is an ordered
/// union. `Accepted` and `Superseded` are sticky; a pending write never
/// overrides a verdict.
pub fn merge_records(existing: &Pattern, incoming: &Pattern) -> Pattern {
    let mut merged = existing.clone();
    merged.evidence_count = existing
        .evidence_count
        .saturating_add(incoming.evidence_count);
    merged.confidence = existing.confidence.max(incoming.confidence);
    let mut seen: HashSet<&str> = existing.provenance.iter().map(String::as_str).collect();
    for source in &incoming.provenance {
        if seen.insert(source.as_str()) {
            merged.provenance.push(source.clone());
        }
    }

    merged.status = match (existing.status, incoming.status) {
        (PatternStatus::Accepted | PatternStatus::Superseded, _) => existing.status,
        (_, PatternStatus::Pending) => existing.status,
        (_, verdict) => verdict,
    };
    merged.rejection_reason = if merged.status == PatternStatus::Rejected {
        incoming
            .rejection_reason
            .clone()
            .or_else(|| existing.rejection_reason.clone())
    } else {
        None
    };
    merged
}

/// Insert or merge `pattern`, appending audit rows for what changed.
/// `canonical_key` is only written on insert. Runs in one transaction.
/// Returns the stored record.
pub fn upsert_pattern(
    conn: &Connection,
    pattern: &Pattern,
    canonical_key: &str,
) -> AutonomicResult<Pattern> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("upsert_pattern begin: {e}")))?;

    match upsert_inner(&tx, pattern, canonical_key) {
        Ok(stored) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("upsert_pattern commit: {e}")))?;
            Ok(stored)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Upsert on an open transaction.
fn upsert_inner(
    conn: &Connection,
    pattern: &Pattern,
    canonical_key: &str,
) -> AutonomicResult<Pattern> {
    match get_pattern(conn, &pattern.id)? {
        None => {
            insert_pattern(conn, pattern, canonical_key)?;
            AuditLogger::log(
                conn,
                &pattern.id,
                AuditOperation::Created,
                serde_json::json!({
                    "tier": pattern.tier,
                    "evidence_count": pattern.evidence_count,
                    "confidence": pattern.confidence.value(),
                }),
            )?;
            log_verdict(conn, pattern, PatternStatus::Pending)?;
            Ok(pattern.clone())
        }
        Some(existing) => {
            let merged = merge_records(&existing, pattern);
            update_pattern(conn, &merged)?;
            if pattern.evidence_count > 0 {
                AuditLogger::log(
                    conn,
                    &pattern.id,
                    AuditOperation::Reinforced,
                    serde_json::json!({
                        "added_evidence": pattern.evidence_count,
                        "evidence_count": merged.evidence_count,
                    }),
                )?;
            }
            log_verdict(conn, &merged, existing.status)?;
            Ok(merged)
        }
    }
}

/// Upsert `accepted` and mark each of `superseded` as superseded by it, in
/// one transaction.
pub fn accept_superseding(
    conn: &Connection,
    accepted: &Pattern,
    canonical_key: &str,
    superseded: &[PatternId],
) -> AutonomicResult<Pattern> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("accept_superseding begin: {e}")))?;

    match accept_superseding_inner(&tx, accepted, canonical_key, superseded) {
        Ok(stored) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("accept_superseding commit: {e}")))?;
            Ok(stored)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn accept_superseding_inner(
    conn: &Connection,
    accepted: &Pattern,
    canonical_key: &str,
    superseded: &[PatternId],
) -> AutonomicResult<Pattern> {
    let stored = upsert_inner(conn, accepted, canonical_key)?;
    for old in superseded.iter().filter(|id| **id != accepted.id) {
        mark_superseded(conn, old, &accepted.id)?;
    }
    Ok(stored)
}

fn log_verdict(conn: &Connection, stored: &Pattern, previous: PatternStatus) -> AutonomicResult<()> {
    if stored.status == previous {
        return Ok(());
    }
    let (operation, details) = match stored.status {
        PatternStatus::Accepted => (
            AuditOperation::Accepted,
            serde_json::json!({ "confidence": stored.confidence.value() }),
        ),
        PatternStatus::Rejected => (
            AuditOperation::Rejected,
            serde_json::to_value(&stored.rejection_reason)?,
        ),
        PatternStatus::Superseded => (
            AuditOperation::Superseded,
            serde_json::json!({ "superseded_by": stored.superseded_by }),
        ),
        PatternStatus::Pending => return Ok(()),
    };
    AuditLogger::log(conn, &stored.id, operation, details)
}

fn insert_pattern(conn: &Connection, pattern: &Pattern, canonical_key: &str) -> AutonomicResult<()> {
    let description = serde_json::to_string(&pattern.description)?;
    let provenance = serde_json::to_string(&pattern.provenance)?;
    let rejection = pattern
        .rejection_reason
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO patterns (
            id, tier, kind, description, confidence, evidence_count, provenance,
            status, created_at, updated_at, superseded_by, rejection_reason, canonical_key
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            pattern.id.as_str(),
            pattern.tier,
            pattern.description.kind_name(),
            description,
            pattern.confidence.value(),
            pattern.evidence_count as i64,
            provenance,
            pattern.status.as_str(),
            pattern.created_at.to_rfc3339(),
            now,
            pattern.superseded_by.as_ref().map(|id| id.as_str().to_string()),
            rejection,
            canonical_key,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn update_pattern(conn: &Connection, pattern: &Pattern) -> AutonomicResult<()> {
    let provenance = serde_json::to_string(&pattern.provenance)?;
    let rejection = pattern
        .rejection_reason
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "UPDATE patterns SET
            confidence = ?2, evidence_count = ?3, provenance = ?4, status = ?5,
            superseded_by = ?6, rejection_reason = ?7, updated_at = ?8
         WHERE id = ?1",
        params![
            pattern.id.as_str(),
            pattern.confidence.value(),
            pattern.evidence_count as i64,
            provenance,
            pattern.status.as_str(),
            pattern.superseded_by.as_ref().map(|id| id.as_str().to_string()),
            rejection,
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Point lookup.
pub fn get_pattern(conn: &Connection, id: &PatternId) -> AutonomicResult<Option<Pattern>> {
    let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE id = ?1");
    let raw = conn
        .query_row(&sql, params![id.as_str()], RawPatternRow::from_row)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawPatternRow::into_pattern).transpose()
}

/// Mark `id` superseded by `by`, if it is currently accepted. Returns whether
/// a row changed.
pub fn mark_superseded(conn: &Connection, id: &PatternId, by: &PatternId) -> AutonomicResult<bool> {
    let changed = conn
        .execute(
            "UPDATE patterns SET status = 'superseded', superseded_by = ?2, updated_at = ?3
             WHERE id = ?1 AND status = 'accepted'",
            params![id.as_str(), by.as_str(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed > 0 {
        AuditLogger::log(
            conn,
            id,
            AuditOperation::Superseded,
            serde_json::json!({ "superseded_by": by }),
        )?;
    }
    Ok(changed > 0)
}

/// Stamp `proposed_at` on every listed record that has none, in one
/// transaction. Returns how many rows changed.
pub fn mark_proposed(conn: &Connection, ids: &[PatternId], at: DateTime<Utc>) -> AutonomicResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("mark_proposed begin: {e}")))?;
    let mut changed = 0;
    for id in ids {
        let rows = tx
            .execute(
                "UPDATE patterns SET proposed_at = ?2 WHERE id = ?1 AND proposed_at IS NULL",
                params![id.as_str(), at.to_rfc3339()],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        if rows > 0 {
            AuditLogger::log(&tx, id, AuditOperation::Proposed, serde_json::json!({}))?;
            changed += rows;
        }
    }
    tx.commit()
        .map_err(|e| to_storage_err(format!("mark_proposed commit: {e}")))?;
    Ok(changed)
}

pub fn set_canonical_key(conn: &Connection, id: &PatternId, canonical_key: &str) -> AutonomicResult<()> {
    conn.execute(
        "UPDATE patterns SET canonical_key = ?2 WHERE id = ?1",
        params![id.as_str(), canonical_key],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Column values as read from SQLite, before JSON decoding.
pub(crate) struct RawPatternRow {
    id: String,
    tier: u32,
    description: String,
    confidence: f64,
    evidence_count: i64,
    provenance: String,
    status: String,
    created_at: String,
    superseded_by: Option<String>,
    rejection_reason: Option<String>,
}

impl RawPatternRow {
    /// Map a row selected with [`PATTERN_COLUMNS`].
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tier: row.get(1)?,
            description: row.get(3)?,
            confidence: row.get(4)?,
            evidence_count: row.get(5)?,
            provenance: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
            superseded_by: row.get(9)?,
            rejection_reason: row.get(10)?,
        })
    }

    pub(crate) fn into_pattern(self) -> AutonomicResult<Pattern> {
        let corrupt = |field: &'static str, reason: String| {
            AutonomicError::StoreUnavailable(StorageError::CorruptRecord {
                id: self.id.clone(),
                field,
                reason,
            })
        };
        let description: StructuralDescription = serde_json::from_str(&self.description)
            .map_err(|e| corrupt("description", e.to_string()))?;
        let provenance: Vec<String> = serde_json::from_str(&self.provenance)
            .map_err(|e| corrupt("provenance", e.to_string()))?;
        let status: PatternStatus = self
            .status
            .parse()
            .map_err(|_| corrupt("status", format!("unknown status '{}'", self.status)))?;
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| corrupt("created_at", e.to_string()))?;
        let rejection_reason: Option<RejectionReason> = self
            .rejection_reason
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| corrupt("rejection_reason", e.to_string()))?;

        Ok(Pattern {
            id: PatternId(self.id),
            tier: self.tier,
            description,
            confidence: Confidence::new(self.confidence),
            evidence_count: self.evidence_count.max(0) as u64,
            provenance,
            created_at,
            status,
            superseded_by: self.superseded_by.map(PatternId),
            rejection_reason,
        })
    }
}

/// Collect mapped rows into patterns.
pub(crate) fn collect_patterns<I>(rows: I) -> AutonomicResult<Vec<Pattern>>
where
    I: Iterator<Item = rusqlite::Result<RawPatternRow>>,
{
    let mut out = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(raw.into_pattern()?);
    }
    Ok(out)
}
