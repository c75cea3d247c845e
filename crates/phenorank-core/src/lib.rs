//! Core types, configuration, errors, identifier grammars, and tracing for
//! the phenorank pipeline.
//!
//! Every other crate in the workspace depends on this one; it depends on no
//! other workspace crate.

pub mod config;
pub mod constants;
pub mod errors;
pub mod identifiers;
pub mod models;
pub mod tracing;

pub use config::PhenoConfig;
pub use errors::{IssueLog, PhenoErrorCode, PipelineError, RecordIssue};
pub use identifiers::IdGrammar;
pub use models::{
    Association, Condition, ConditionAttribute, DuplicatePolicy, Feature, InheritanceStrategy,
    MatrixVariant, SourceProfile, Tables,
};
