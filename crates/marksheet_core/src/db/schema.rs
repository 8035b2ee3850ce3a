//! `students` schema bootstrap.
//!
//! # Invariants
//! - The schema is created in one transaction and stamped with
//!   `SCHEMA_VERSION` in `PRAGMA user_version`.
//! - A database already at `SCHEMA_VERSION` is left untouched.
//! - A database stamped with a newer version is refused, never modified.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the `students` table on a fresh database.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if current > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    debug!("event=db_schema module=db status=ok version={SCHEMA_VERSION}");
    Ok(())
}
