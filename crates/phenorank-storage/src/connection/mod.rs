//! Database handle: one connection, pragmas and migrations applied on open.

pub mod pragmas;

use std::path::{Path, PathBuf};

use phenorank_core::errors::StorageError;
use phenorank_core::models::{Condition, Tables};
use rusqlite::Connection;

use self::pragmas::apply_pragmas;
use crate::{migrations, queries};

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database at `path`, creating its parent directory.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let conn = Connection::open(path).map_err(|e| StorageError::SqliteError {
            message: format!("open {}: {e}", path.display()),
        })?;
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn replace_tables(&self, tables: &Tables) -> Result<(), StorageError> {
        queries::tables::replace_tables(&self.conn, tables)
    }

    pub fn load_tables(&self) -> Result<Tables, StorageError> {
        queries::tables::load_tables(&self.conn)
    }

    pub fn update_enrichment(&self, conditions: &[Condition]) -> Result<usize, StorageError> {
        queries::tables::update_enrichment(&self.conn, conditions)
    }

    pub fn counts(&self) -> Result<queries::tables::RelationCounts, StorageError> {
        queries::tables::relation_counts(&self.conn)
    }
}
