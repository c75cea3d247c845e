//! SQLite persistence layer for phenorank.
//!
//! - `connection`: database handle with pragmas and migrations applied
//! - `migrations`: schema versions keyed on `PRAGMA user_version`
//! - `queries`: whole-relation replace/load and enrichment updates
//! - `export`: TSV export of the three relations and row-limited previews

pub mod connection;
pub mod export;
pub mod migrations;
pub mod queries;

pub use connection::Database;
pub use export::{export_tables, write_previews, ExportedFiles};
