//! Versioned schema migrations. Each migration runs once, inside its own
//! transaction, and is recorded in `schema_version`.

mod v001_pattern_tables;
mod v002_audit_tables;
mod v003_lookup_columns;

use rusqlite::{params, Connection};
use tracing::info;

use autonomic_core::errors::{AutonomicError, AutonomicResult, StorageError};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> AutonomicResult<()>;

const MIGRATIONS: &[(u32, MigrationFn)] = &[
    (1, v001_pattern_tables::migrate),
    (2, v002_audit_tables::migrate),
    (3, v003_lookup_columns::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 3;

/// Apply every migration newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> AutonomicResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| migration_err(*version, e.to_string()))?;
        migrate(&tx).map_err(|e| migration_err(*version, e.to_string()))?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![version],
        )
        .map_err(|e| migration_err(*version, e.to_string()))?;
        tx.commit()
            .map_err(|e| migration_err(*version, e.to_string()))?;
        info!(version = version, "applied migration");
    }
    current_version(conn)
}

/// Highest applied schema version (0 for an empty database).
pub fn current_version(conn: &Connection) -> AutonomicResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

fn migration_err(version: u32, reason: String) -> AutonomicError {
    AutonomicError::StoreUnavailable(StorageError::MigrationFailed { version, reason })
}
