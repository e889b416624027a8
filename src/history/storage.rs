//! Key-value storage media for persisted history

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value medium
pub trait KeyValueStorage: Send + Sync {
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Thread-safe SQLite-backed storage
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open or create storage at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl KeyValueStorage for SqliteStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn()?.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Storage that lives only as long as the process
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> StorageResult<MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.values()?.remove(key);
        Ok(())
    }
}

/// Storage whose writes always fail, like a page opened from disk
#[cfg(test)]
#[derive(Default)]
pub struct FailingStorage;

#[cfg(test)]
impl KeyValueStorage for FailingStorage {
    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("writes are not allowed".to_string()))
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(storage: &dyn KeyValueStorage) {
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "one").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("one"));
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        // Removing a missing key is not an error
        storage.remove("k").unwrap();
    }

    #[test]
    fn test_sqlite_storage() {
        exercise(&SqliteStorage::open_in_memory().unwrap());
    }

    #[test]
    fn test_memory_storage() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn test_sqlite_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        SqliteStorage::open(&path).unwrap().set("k", "kept").unwrap();
        let reopened = SqliteStorage::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("kept"));
    }
}
