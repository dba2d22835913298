//! v002: pattern_audit_log.

use rusqlite::Connection;

use autonomic_core::errors::AutonomicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AutonomicResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pattern_audit_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            pattern_id  TEXT NOT NULL,
            operation   TEXT NOT NULL,
            details     TEXT NOT NULL DEFAULT '{}',
            timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_audit_pattern ON pattern_audit_log(pattern_id);
        CREATE INDEX IF NOT EXISTS idx_audit_operation ON pattern_audit_log(operation);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
