//! v003: canonical lookup key, proposal marker, store metadata.

use rusqlite::Connection;

use autonomic_core::errors::AutonomicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AutonomicResult<()> {
    conn.execute_batch(
        "
        ALTER TABLE patterns ADD COLUMN canonical_key TEXT;
        ALTER TABLE patterns ADD COLUMN proposed_at TEXT;

        CREATE INDEX IF NOT EXISTS idx_patterns_canonical_key ON patterns(canonical_key);
        CREATE INDEX IF NOT EXISTS idx_patterns_unproposed
            ON patterns(status, proposed_at, confidence);

        CREATE TABLE IF NOT EXISTS store_meta (
            name  TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
