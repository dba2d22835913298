//! Per-connection SQLite settings.

use rusqlite::Connection;

use autonomic_core::errors::AutonomicResult;

use crate::to_storage_err;

/// What a connection is used for. Only the writer may switch journal modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    Writer,
    Reader,
}

impl ConnectionRole {
    fn pragmas(self) -> &'static str {
        match self {
            // WAL lets readers proceed while a verdict batch is being written.
            Self::Writer => {
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA cache_size = -32000;
                 PRAGMA busy_timeout = 5000;"
            }
            Self::Reader => {
                "PRAGMA query_only = ON;
                 PRAGMA cache_size = -8000;
                 PRAGMA busy_timeout = 5000;"
            }
        }
    }
}

pub fn configure(conn: &Connection, role: ConnectionRole) -> AutonomicResult<()> {
    conn.execute_batch(role.pragmas())
        .map_err(|e| to_storage_err(format!("configure {role:?} connection: {e}")))
}

/// Whether the database behind `conn` is in WAL mode.
pub fn verify_wal_mode(conn: &Connection) -> AutonomicResult<bool> {
    conn.pragma_query_value(None, "journal_mode", |row| row.get::<_, String>(0))
        .map(|mode| mode.eq_ignore_ascii_case("wal"))
        .map_err(|e| to_storage_err(e.to_string()))
}
