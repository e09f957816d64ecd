//! Durable key-value storage for session state.
//!
//! The web client kept the session in browser local storage under a handful
//! of fixed keys; here the same keys live in a SQLite table. A `MemoryStore`
//! with identical semantics backs tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use wl_core::error::{WlError, WlResult};

use crate::db::Database;

/// String key-value storage.
///
/// `remove_many` is all-or-nothing: either every key is removed or none is.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> WlResult<Option<String>>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> WlResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> WlResult<()>;

    /// Remove several keys atomically.
    fn remove_many(&self, keys: &[&str]) -> WlResult<()>;

    /// All stored keys, sorted.
    fn keys(&self) -> WlResult<Vec<String>>;
}

/// SQLite-backed store over the `local_storage` table.
#[derive(Clone)]
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> WlResult<Option<String>> {
        let conn = self.db.conn()?;
        conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| WlError::Storage(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> WlResult<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp_millis()],
        )
        .map_err(|e| WlError::Storage(e.to_string()))?;
        debug!(key, "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> WlResult<()> {
        let conn = self.db.conn()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1", [key])
            .map_err(|e| WlError::Storage(e.to_string()))?;
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> WlResult<()> {
        self.db.transaction(|conn| {
            for key in keys {
                conn.execute("DELETE FROM local_storage WHERE key = ?1", [key])
                    .map_err(|e| WlError::Storage(e.to_string()))?;
            }
            Ok(())
        })?;
        debug!(count = keys.len(), "removed keys");
        Ok(())
    }

    fn keys(&self) -> WlResult<Vec<String>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM local_storage ORDER BY key")
            .map_err(|e| WlError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| WlError::Storage(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| WlError::Storage(e.to_string()))
    }
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> WlResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| WlError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> WlResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> WlResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> WlResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> WlResult<()> {
        let mut values = self.lock()?;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }

    fn keys(&self) -> WlResult<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
