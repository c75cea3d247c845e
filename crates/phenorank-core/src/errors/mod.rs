//! Error handling for phenorank.
//! One error enum per subsystem, `thiserror` only.
//!
//! Fatal errors abort the stage that raised them. Record-level problems are
//! [`RecordIssue`] values collected in an [`IssueLog`] and returned in the
//! stage report.

pub mod compile_error;
pub mod config_error;
pub mod enrich_error;
pub mod error_code;
pub mod issue;
pub mod pipeline_error;
pub mod retrieval_error;
pub mod storage_error;
pub mod table_error;

pub use compile_error::CompileError;
pub use config_error::ConfigError;
pub use enrich_error::EnrichError;
pub use error_code::PhenoErrorCode;
pub use issue::{IssueLog, RecordIssue};
pub use pipeline_error::PipelineError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
pub use table_error::{ColumnRole, TableError};
