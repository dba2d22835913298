//! Multi-row queries: tier ranges, overlap candidates, pending proposals,
//! status counts, and store metadata.

use rusqlite::{params, Connection, OptionalExtension};

use autonomic_core::errors::AutonomicResult;
use autonomic_core::models::StoreStats;
use autonomic_core::{Pattern, PatternId, StructuralDescription};

use super::pattern_crud::{collect_patterns, RawPatternRow, PATTERN_COLUMNS};
use crate::to_storage_err;

/// Accepted patterns with `min_tier <= tier <= max_tier`, ordered by tier then id.
pub fn list_accepted(conn: &Connection, min_tier: u32, max_tier: u32) -> AutonomicResult<Vec<Pattern>> {
    let sql = format!(
        "SELECT {PATTERN_COLUMNS} FROM patterns
         WHERE status = 'accepted' AND tier BETWEEN ?1 AND ?2
         ORDER BY tier ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![min_tier, max_tier], RawPatternRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_patterns(rows)
}

/// Every pattern of one description kind, any status, ordered by id.
pub fn by_kind(conn: &Connection, kind: &str) -> AutonomicResult<Vec<Pattern>> {
    let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE kind = ?1 ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![kind], RawPatternRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_patterns(rows)
}

/// Every pattern, any status, sharing one canonical key.
pub fn by_canonical_key(conn: &Connection, canonical_key: &str) -> AutonomicResult<Vec<Pattern>> {
    let sql = format!(
        "SELECT {PATTERN_COLUMNS} FROM patterns WHERE canonical_key = ?1 ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![canonical_key], RawPatternRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_patterns(rows)
}

/// Accepted, never proposed, and at or above both minimums.
pub fn list_unproposed(
    conn: &Connection,
    min_confidence: f64,
    min_evidence: u64,
) -> AutonomicResult<Vec<Pattern>> {
    let sql = format!(
        "SELECT {PATTERN_COLUMNS} FROM patterns
         WHERE status = 'accepted' AND proposed_at IS NULL
           AND confidence >= ?1 AND evidence_count >= ?2
         ORDER BY id ASC"
    );
    let min_evidence = i64::try_from(min_evidence).unwrap_or(i64::MAX);
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![min_confidence, min_evidence], RawPatternRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_patterns(rows)
}

/// Id and description of every record, for rebuilding canonical keys.
pub fn all_descriptions(conn: &Connection) -> AutonomicResult<Vec<(PatternId, StructuralDescription)>> {
    let mut stmt = conn
        .prepare("SELECT id, description FROM patterns ORDER BY id ASC")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, description) = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push((PatternId(id), serde_json::from_str(&description)?));
    }
    Ok(out)
}

pub fn meta_value(conn: &Connection, name: &str) -> AutonomicResult<Option<String>> {
    conn.query_row(
        "SELECT value FROM store_meta WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn set_meta_value(conn: &Connection, name: &str, value: &str) -> AutonomicResult<()> {
    conn.execute(
        "INSERT INTO store_meta (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        params![name, value],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Record counts per status.
pub fn stats(conn: &Connection) -> AutonomicResult<StoreStats> {
    let mut stmt = conn
        .prepare("SELECT status, COUNT(*) FROM patterns GROUP BY status")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stats = StoreStats::default();
    for row in rows {
        let (status, count) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let count = count.max(0) as usize;
        match status.as_str() {
            "pending" => stats.pending = count,
            "accepted" => stats.accepted = count,
            "rejected" => stats.rejected = count,
            "superseded" => stats.superseded = count,
            other => {
                tracing::warn!(status = other, "unknown status in patterns table");
            }
        }
    }
    Ok(stats)
}
