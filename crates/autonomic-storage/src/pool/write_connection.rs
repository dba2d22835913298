//! Single write connection behind a mutex. Serialized writes, so every
//! read-modify-write on a pattern is one critical section.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use autonomic_core::errors::{AutonomicError, AutonomicResult, StorageError};

use super::pragmas::{configure, ConnectionRole};
use crate::to_storage_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path) -> AutonomicResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        configure(&conn, ConnectionRole::Writer)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> AutonomicResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        configure(&conn, ConnectionRole::Writer)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> AutonomicResult<T>
    where
        F: FnOnce(&Connection) -> AutonomicResult<T>,
    {
        let guard = self.conn.lock().map_err(|_| {
            AutonomicError::StoreUnavailable(StorageError::LockPoisoned {
                resource: "write connection",
            })
        })?;
        f(&guard)
    }
}
