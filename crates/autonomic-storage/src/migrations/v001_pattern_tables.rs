//! v001: patterns table with status/tier and kind indexes.

use rusqlite::Connection;

use autonomic_core::errors::AutonomicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AutonomicResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS patterns (
            id               TEXT PRIMARY KEY,
            tier             INTEGER NOT NULL,
            kind             TEXT NOT NULL,
            description      TEXT NOT NULL,
            confidence       REAL NOT NULL,
            evidence_count   INTEGER NOT NULL,
            provenance       TEXT NOT NULL DEFAULT '[]',
            status           TEXT NOT NULL,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            superseded_by    TEXT,
            rejection_reason TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_patterns_status_tier ON patterns(status, tier);
        CREATE INDEX IF NOT EXISTS idx_patterns_kind ON patterns(kind);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
