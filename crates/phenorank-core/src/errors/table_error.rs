//! Table building errors.

use std::fmt;

use super::error_code::{self, PhenoErrorCode};

/// Logical column a schema strategy is trying to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Condition,
    Feature,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition => f.write_str("condition identifier"),
            Self::Feature => f.write_str("feature identifier"),
        }
    }
}

/// Structural failures while building the canonical relations.
/// Any of these aborts the whole build; nothing is written.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Missing source: {path}")]
    MissingSource { path: String },

    #[error(
        "Schema detection failed for {source_name}: no {role} column \
         (best match fraction {best_fraction:.3} < threshold {threshold:.3})"
    )]
    SchemaDetectionFailure {
        source_name: String,
        role: ColumnRole,
        best_fraction: f64,
        threshold: f64,
    },

    #[error("Source {source_name} contains no data rows")]
    EmptySource { source_name: String },

    #[error("Source {source_name} yielded no valid associations after normalization")]
    NoAssociations { source_name: String },

    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid label document {path}: {message}")]
    InvalidLabels { path: String, message: String },
}

impl PhenoErrorCode for TableError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingSource { .. } => error_code::MISSING_SOURCE,
            Self::SchemaDetectionFailure { .. } => error_code::SCHEMA_DETECTION_FAILURE,
            Self::EmptySource { .. } | Self::NoAssociations { .. } => error_code::EMPTY_SOURCE,
            Self::Io { .. } | Self::InvalidLabels { .. } => error_code::IO_ERROR,
        }
    }
}
