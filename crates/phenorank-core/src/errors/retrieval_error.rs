//! Retrieval errors.

use super::error_code::{self, PhenoErrorCode};
use super::CompileError;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// No query code resolved to a matrix column. Fatal to this call only.
    #[error("No query term resolved to a known feature (unknown: {})", .unknown_terms.join(", "))]
    EmptyQuery { unknown_terms: Vec<String> },

    #[error("Retrieval artifacts unavailable: {0}")]
    Artifacts(#[from] CompileError),
}

impl PhenoErrorCode for RetrievalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyQuery { .. } => error_code::EMPTY_QUERY,
            Self::Artifacts(e) => e.error_code(),
        }
    }
}
