//! Application context: configuration plus the single storage connection.
//!
//! # Invariants
//! - Exactly one connection per context, opened with the schema applied.
//! - The connection is released when the context is dropped, on every exit
//!   path; `close` surfaces release errors explicitly.
//! - Stores and controllers borrow from the context; there are no globals.

use crate::config::AppConfig;
use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::export::ExportSummary;
use crate::repo::student_repo::SqliteStudentRepository;
use crate::service::form_controller::{FormController, FormResult};
use log::info;
use rusqlite::Connection;

pub struct AppContext {
    config: AppConfig,
    conn: Connection,
}

impl AppContext {
    /// Opens the database file named by `config.db_path`.
    pub fn open(config: AppConfig) -> DbResult<Self> {
        let conn = open_db(&config.db_path)?;
        Ok(Self { config, conn })
    }

    /// Opens a throwaway in-memory database; `config.db_path` is ignored.
    pub fn open_in_memory(config: AppConfig) -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self { config, conn })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Record store bound to this context's connection.
    pub fn store(&self) -> SqliteStudentRepository<'_> {
        SqliteStudentRepository::new(&self.conn)
    }

    pub fn controller(&self) -> FormController<SqliteStudentRepository<'_>> {
        FormController::new(self.store())
    }

    /// Exports every record to the configured `export_path`.
    pub fn export_all(&self) -> FormResult<ExportSummary> {
        self.controller().export(&self.config.export_path)
    }

    /// Closes the connection, reporting any error SQLite raises on release.
    pub fn close(self) -> DbResult<()> {
        self.conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        info!("event=db_close module=db status=ok");
        Ok(())
    }
}
