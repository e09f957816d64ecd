//! Local database initialization, connection pooling, and lifecycle.
//!
//! Uses SQLite (optionally in WAL mode) with r2d2 connection pooling,
//! applies versioned migrations on startup, and optionally verifies the
//! file with an integrity check before use.

use std::path::Path;
use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{error, info, warn};

use wl_core::config::StorageConfig;
use wl_core::error::{WlError, WlResult};

use crate::migrations;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database wrapper providing initialization, pooling, and transactions.
#[derive(Clone)]
pub struct Database {
    pool: Arc<DbPool>,
}

impl Database {
    /// Open (creating if needed) the database at `db_path` and migrate it.
    pub fn init(db_path: &Path, config: &StorageConfig) -> WlResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("opening local storage at {}", db_path.display());

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_customizer(Box::new(ConnectionCustomizer {
                wal_mode: config.wal_mode,
            }))
            .build(manager)
            .map_err(|e| WlError::Pool(e.to_string()))?;

        let db = Self {
            pool: Arc::new(pool),
        };

        if config.integrity_check {
            db.run_integrity_check()?;
        }
        {
            let conn = db.conn()?;
            migrations::run_migrations(&conn)?;
        }

        Ok(db)
    }

    /// Get a connection from the pool.
    pub fn conn(&self) -> WlResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| WlError::Pool(e.to_string()))
    }

    /// Run a SQLite integrity check.
    pub fn run_integrity_check(&self) -> WlResult<()> {
        let conn = self.conn()?;
        let result: String = conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))
            .map_err(|e| WlError::Storage(e.to_string()))?;

        if result != "ok" {
            error!("local storage integrity check failed: {result}");
            return Err(WlError::Storage(format!("integrity check failed: {result}")));
        }
        Ok(())
    }

    /// Execute a function within a transaction; rolled back if it errors.
    pub fn transaction<T, F>(&self, f: F) -> WlResult<T>
    where
        F: FnOnce(&Connection) -> WlResult<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| WlError::Storage(e.to_string()))?;

        let result = f(&tx)?;

        tx.commit().map_err(|e| WlError::Storage(e.to_string()))?;

        Ok(result)
    }

    /// Number of stored keys.
    pub fn key_count(&self) -> WlResult<i64> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))
            .map_err(|e| WlError::Storage(e.to_string()))
    }

    /// Drop all stored keys. Returns how many were removed.
    pub fn reset(&self) -> WlResult<usize> {
        warn!("resetting local storage");
        let conn = self.conn()?;
        conn.execute("DELETE FROM local_storage", [])
            .map_err(|e| WlError::Storage(e.to_string()))
    }
}

/// r2d2 connection customizer that applies PRAGMA settings.
#[derive(Debug)]
struct ConnectionCustomizer {
    wal_mode: bool,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        if self.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (Database, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::init(&path, &StorageConfig::default()).unwrap();
        (db, dir)
    }

    #[test]
    fn test_database_init() {
        let (db, _dir) = test_db();
        assert_eq!(db.key_count().unwrap(), 0);
        assert!(db.run_integrity_check().is_ok());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let (db, _dir) = test_db();
        let result: WlResult<()> = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO local_storage (key, value, updated_at) VALUES ('a', '1', 0)",
                [],
            )
            .map_err(|e| WlError::Storage(e.to_string()))?;
            Err(WlError::Internal("abort".into()))
        });
        assert!(result.is_err());
        assert_eq!(db.key_count().unwrap(), 0);
    }

    #[test]
    fn test_reset_empties_storage() {
        let (db, _dir) = test_db();
        for key in ["token", "user_info"] {
            db.conn()
                .unwrap()
                .execute(
                    "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, 'v', 0)",
                    [key],
                )
                .unwrap();
        }
        assert_eq!(db.key_count().unwrap(), 2);
        assert_eq!(db.reset().unwrap(), 2);
        assert_eq!(db.key_count().unwrap(), 0);
        assert_eq!(db.reset().unwrap(), 0);
    }

    #[test]
    fn test_init_without_integrity_check() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            integrity_check: false,
            ..StorageConfig::default()
        };
        let db = Database::init(&dir.path().join("fast.db"), &config).unwrap();
        assert_eq!(db.key_count().unwrap(), 0);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("persist.db");
        {
            let db = Database::init(&path, &StorageConfig::default()).unwrap();
            db.conn()
                .unwrap()
                .execute(
                    "INSERT INTO local_storage (key, value, updated_at) VALUES ('k', 'v', 0)",
                    [],
                )
                .unwrap();
        }
        let db = Database::init(&path, &StorageConfig::default()).unwrap();
        assert_eq!(db.key_count().unwrap(), 1);
    }
}
