//! Enrichment errors.
//!
//! These are document-scoped: the enricher records them, skips the
//! document, and moves on. They never abort a run.

use super::error_code::{self, PhenoErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("XML error in {path} at byte {position}: {message}")]
    Xml {
        path: String,
        position: u64,
        message: String,
    },
}

impl PhenoErrorCode for EnrichError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            Self::Xml { .. } => error_code::XML_ERROR,
        }
    }
}
