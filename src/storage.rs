//! SQLite storage engine wrapper
//!
//! Thin layer over rusqlite exposing the row operations of the `memory`
//! table: point lookup, upsert, delete, delete-all, plus the schema checks
//! run at open time. Every statement executes in autocommit mode, so each
//! call is one durable unit.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::error::{Error, Result};
use crate::store::{Entry, TypeTag};

const MEMORY_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS memory (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    type TEXT NOT NULL
)";

/// Handle to one SQLite-backed `memory` table
pub struct SqliteStorage {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStorage {
    /// Open an existing store read-write
    ///
    /// Fails with [`Error::StorageUnavailable`] when the file is missing or
    /// does not contain the `memory` table; no half-open handle is returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_WRITE)
    }

    /// Open an existing store read-only
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    /// Create the store file and the `memory` table if missing, then open
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        conn.execute(MEMORY_SCHEMA, [])?;
        Ok(SqliteStorage { conn, path })
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> Result<Self> {
        let conn =
            Connection::open_with_flags(path, flags).map_err(|e| Error::StorageUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::check_schema(&conn, path)?;
        Ok(SqliteStorage {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Verify the `memory` table is present
    fn check_schema(conn: &Connection, path: &Path) -> Result<()> {
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'memory'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::StorageUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        match found {
            Some(_) => Ok(()),
            None => Err(Error::StorageUnavailable {
                path: path.to_path_buf(),
                reason: "missing 'memory' table".to_string(),
            }),
        }
    }

    /// Path this storage was opened against
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point lookup by hashed key
    pub fn fetch(&self, key: i64) -> Result<Option<Entry>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT value, type FROM memory WHERE key = ?1",
                params![key.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((payload, tag)) => Ok(Some(Entry::new(key, payload, TypeTag::parse(&tag)?))),
            None => Ok(None),
        }
    }

    /// Whether a row with this hashed key exists
    pub fn contains(&self, key: i64) -> Result<bool> {
        let row: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM memory WHERE key = ?1",
                params![key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }

    /// Insert or replace one row, committed before returning
    pub fn upsert(&self, entry: &Entry) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO memory (key, value, type) VALUES (?1, ?2, ?3)",
            params![entry.key.to_string(), entry.payload, entry.tag.as_str()],
        )?;
        Ok(())
    }

    /// Delete one row; no-op when the key is absent
    pub fn remove(&self, key: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM memory WHERE key = ?1", params![key.to_string()])?;
        Ok(())
    }

    /// Delete every row
    pub fn remove_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM memory", [])?;
        Ok(())
    }

    /// Close the connection, surfacing the first close error
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }
}
