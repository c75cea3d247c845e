//! Top-level pipeline error.

use super::error_code::PhenoErrorCode;
use super::{CompileError, ConfigError, EnrichError, RetrievalError, StorageError, TableError};

/// Errors that can abort a pipeline run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PhenoErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Table(e) => e.error_code(),
            Self::Enrich(e) => e.error_code(),
            Self::Compile(e) => e.error_code(),
            Self::Retrieval(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
        }
    }
}
