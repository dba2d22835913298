//! Read-only connections for concurrent pattern lookups.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, TryLockError};

use rusqlite::{Connection, OpenFlags};

use autonomic_core::errors::{AutonomicError, AutonomicResult, StorageError};

use super::pragmas::{configure, ConnectionRole};
use crate::to_storage_err;

const MAX_READERS: usize = 8;

/// Fixed set of read-only connections to one database file.
///
/// A read takes the first idle connection at or after a rotating cursor and
/// only blocks when every connection is busy.
pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// `size` is clamped to `1..=8`.
    pub fn open(path: &Path, size: usize) -> AutonomicResult<Self> {
        let connections = (0..size.clamp(1, MAX_READERS))
            .map(|_| open_reader(path).map(Mutex::new))
            .collect::<AutonomicResult<Vec<_>>>()?;
        Ok(Self {
            connections,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> AutonomicResult<T>
    where
        F: FnOnce(&Connection) -> AutonomicResult<T>,
    {
        let n = self.connections.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % n;
        for offset in 0..n {
            match self.connections[(start + offset) % n].try_lock() {
                Ok(guard) => return f(&guard),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => return Err(poisoned()),
            }
        }
        let guard = self.connections[start].lock().map_err(|_| poisoned())?;
        f(&guard)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

fn open_reader(path: &Path) -> AutonomicResult<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| to_storage_err(format!("open reader on {}: {e}", path.display())))?;
    configure(&conn, ConnectionRole::Reader)?;
    Ok(conn)
}

fn poisoned() -> AutonomicError {
    AutonomicError::StoreUnavailable(StorageError::LockPoisoned {
        resource: "read pool",
    })
}
