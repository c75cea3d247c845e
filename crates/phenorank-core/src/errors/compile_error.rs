//! Matrix compilation and artifact errors.

use super::error_code::{self, PhenoErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Artifact not found: {path}")]
    MissingArtifact { path: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error on {path}: {message}")]
    Serialization { path: String, message: String },

    #[error(
        "Variant {variant} has shape ({rows}, {cols}) but mappings declare ({expected_rows}, {expected_cols})"
    )]
    ShapeMismatch {
        variant: String,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("Index mapping in {path} is invalid: {message}")]
    InvalidMapping { path: String, message: String },

    #[error("Variant {variant} is structurally invalid: {message}")]
    InvalidMatrix { variant: String, message: String },
}

impl PhenoErrorCode for CompileError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            _ => error_code::ARTIFACT_ERROR,
        }
    }
}
