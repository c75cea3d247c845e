//! PRAGMA configuration applied to every connection.

use phenorank_core::errors::StorageError;
use rusqlite::Connection;

/// WAL journal, NORMAL sync, 5s busy timeout, in-memory temp store.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply pragmas: {e}"),
    })
}
