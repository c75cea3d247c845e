//! PhenoErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to expose a structured code string
/// that survives message rewording.
pub trait PhenoErrorCode {
    /// Returns the error code string (e.g., "MISSING_SOURCE").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const MISSING_SOURCE: &str = "MISSING_SOURCE";
pub const SCHEMA_DETECTION_FAILURE: &str = "SCHEMA_DETECTION_FAILURE";
pub const MALFORMED_RECORD: &str = "MALFORMED_RECORD";
pub const UNRESOLVED_EDGE: &str = "UNRESOLVED_EDGE";
pub const UNKNOWN_QUERY_TERM: &str = "UNKNOWN_QUERY_TERM";
pub const EMPTY_QUERY: &str = "EMPTY_QUERY";
pub const EMPTY_SOURCE: &str = "EMPTY_SOURCE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const IO_ERROR: &str = "IO_ERROR";
pub const XML_ERROR: &str = "XML_ERROR";
pub const ARTIFACT_ERROR: &str = "ARTIFACT_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
