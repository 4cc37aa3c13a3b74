//! Durable key-value storage for the studio collections

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::paths::get_db_path;

/// Whole-value key-value store. Each key holds one serialized collection.
pub trait KeyValueStore: Send + Sync {
    /// Returns the payload stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the payload stored under `key`
    fn set(&self, key: &str, payload: &str) -> Result<(), StorageError>;
}

/// SQLite-backed store in the application data directory
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    db_path: PathBuf,
}

impl SqliteKeyValueStore {
    /// Opens the store at the default database path
    pub fn open_default() -> Result<Self, StorageError> {
        let db_path = get_db_path().map_err(StorageError::Io)?;
        Self::open(db_path)
    }

    /// Opens the store at `db_path`, creating the file and table if needed
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = Self {
            db_path: db_path.into(),
        };
        init_database(&store.db_path)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

/// Initializes the SQLite database, creating tables if needed
fn init_database(db_path: &Path) -> Result<Connection, StorageError> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections (
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = init_database(&self.db_path)?;
        let payload = conn
            .query_row(
                "SELECT payload FROM collections WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn set(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        let conn = init_database(&self.db_path)?;
        let timestamp = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO collections (key, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
            params![key, payload, timestamp],
        )?;
        Ok(())
    }
}

/// Process-local store, used by tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteKeyValueStore::open(dir.path().join("studio.db")).unwrap();
        assert_eq!(store.get("favorites").unwrap(), None);
    }

    #[test]
    fn sqlite_set_replaces_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteKeyValueStore::open(dir.path().join("nested/studio.db")).unwrap();

        store.set("favorites", "[1]").unwrap();
        store.set("favorites", "[2,1]").unwrap();
        store.set("ledger", "[]").unwrap();

        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[2,1]"));
        assert_eq!(store.get("ledger").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.db");
        SqliteKeyValueStore::open(&path)
            .unwrap()
            .set("ledger", "[\"x\"]")
            .unwrap();

        let reopened = SqliteKeyValueStore::open(&path).unwrap();
        assert_eq!(reopened.get("ledger").unwrap().as_deref(), Some("[\"x\"]"));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryKeyValueStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("other").unwrap(), None);
    }
}
