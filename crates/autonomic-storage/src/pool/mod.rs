//! One serialized writer plus an optional round-robin read pool.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use autonomic_core::errors::AutonomicResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// File-backed pools read through `readers`. An in-memory pool has no
/// readers: separate in-memory connections are separate databases, so reads
/// go through the writer.
pub struct ConnectionPool {
    writer: WriteConnection,
    readers: Option<ReadPool>,
    db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path, read_pool_size: usize) -> AutonomicResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> AutonomicResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory()?,
            readers: None,
            db_path: None,
        })
    }

    /// Run a read on a pooled connection, or on the writer for in-memory pools.
    pub fn with_reader<F, T>(&self, f: F) -> AutonomicResult<T>
    where
        F: FnOnce(&Connection) -> AutonomicResult<T>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.writer.with_conn(f),
        }
    }

    pub fn with_writer<F, T>(&self, f: F) -> AutonomicResult<T>
    where
        F: FnOnce(&Connection) -> AutonomicResult<T>,
    {
        self.writer.with_conn(f)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Dedicated read connections (0 for in-memory pools).
    pub fn reader_count(&self) -> usize {
        self.readers.as_ref().map_or(0, ReadPool::size)
    }
}
