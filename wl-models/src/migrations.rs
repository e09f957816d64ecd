//! Versioned local storage migrations.
//!
//! Migrations run sequentially from the stored version to the latest.

use rusqlite::Connection;
use tracing::{info, warn};
use wl_core::constants::DB_SCHEMA_VERSION;
use wl_core::error::{WlError, WlResult};

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> WlResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")
        .map_err(|e| WlError::Migration(e.to_string()))?;

    let current_version = get_schema_version(conn)?;

    if current_version >= DB_SCHEMA_VERSION {
        info!("local storage schema is up to date (version {current_version})");
        return Ok(());
    }

    info!("running migrations from version {current_version} to {DB_SCHEMA_VERSION}");

    for version in (current_version + 1)..=DB_SCHEMA_VERSION {
        run_migration(conn, version)?;
    }

    set_schema_version(conn, DB_SCHEMA_VERSION)?;
    Ok(())
}

fn get_schema_version(conn: &Connection) -> WlResult<i32> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .map_err(|e| WlError::Migration(e.to_string()))?;

    if count == 0 {
        conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])
            .map_err(|e| WlError::Migration(e.to_string()))?;
        return Ok(0);
    }

    conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get(0)
    })
    .map_err(|e| WlError::Migration(e.to_string()))
}

fn set_schema_version(conn: &Connection, version: i32) -> WlResult<()> {
    conn.execute("UPDATE schema_version SET version = ?1", [version])
        .map_err(|e| WlError::Migration(e.to_string()))?;
    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> WlResult<()> {
    info!("applying migration version {version}");

    match version {
        1 => migration_v1(conn),
        _ => {
            warn!("unknown migration version {version}, skipping");
            Ok(())
        }
    }
}

/// Migration v1: the key-value table backing session persistence.
fn migration_v1(conn: &Connection) -> WlResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS local_storage (
             key        TEXT PRIMARY KEY NOT NULL,
             value      TEXT NOT NULL,
             updated_at INTEGER NOT NULL
         );",
    )
    .map_err(|e| WlError::Migration(e.to_string()))
}
