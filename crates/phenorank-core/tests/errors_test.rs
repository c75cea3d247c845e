//! Tests for the phenorank error handling system.

use std::collections::HashSet;

use phenorank_core::errors::error_code::{self, PhenoErrorCode};
use phenorank_core::errors::*;

#[test]
fn test_all_errors_have_error_code() {
    let errors: Vec<Box<dyn Fn() -> &'static str>> = vec![
        Box::new(|| ConfigError::FileNotFound { path: "/tmp".into() }.error_code()),
        Box::new(|| TableError::MissingSource { path: "x.hpoa".into() }.error_code()),
        Box::new(|| {
            EnrichError::Xml {
                path: "en_product4.xml".into(),
                position: 10,
                message: "unexpected end".into(),
            }
            .error_code()
        }),
        Box::new(|| CompileError::MissingArtifact { path: "X_weight.json".into() }.error_code()),
        Box::new(|| RetrievalError::EmptyQuery { unknown_terms: vec![] }.error_code()),
        Box::new(|| StorageError::SqliteError { message: "locked".into() }.error_code()),
    ];
    for code in errors {
        assert!(!code().is_empty());
    }
}

#[test]
fn test_error_kinds_map_to_stable_codes() {
    let missing = TableError::MissingSource { path: "phenotype.hpoa".into() };
    assert_eq!(missing.error_code(), error_code::MISSING_SOURCE);

    let schema = TableError::SchemaDetectionFailure {
        source_name: "orpha.tsv".into(),
        role: ColumnRole::Condition,
        best_fraction: 0.01,
        threshold: 0.02,
    };
    assert_eq!(schema.error_code(), error_code::SCHEMA_DETECTION_FAILURE);

    let empty = RetrievalError::EmptyQuery {
        unknown_terms: vec!["HP:9999999".into()],
    };
    assert_eq!(empty.error_code(), error_code::EMPTY_QUERY);

    let issue = RecordIssue::malformed_line("phenotype.hpoa", 4, "bad condition id");
    assert_eq!(issue.error_code(), error_code::MALFORMED_RECORD);
    let edge = RecordIssue::UnresolvedEdge {
        condition_id: "OMIM:1".into(),
        feature_id: "HP:1".into(),
    };
    assert_eq!(edge.error_code(), error_code::UNRESOLVED_EDGE);
    let term = RecordIssue::UnknownQueryTerm { term: "HP:2".into() };
    assert_eq!(term.error_code(), error_code::UNKNOWN_QUERY_TERM);
}

#[test]
fn test_from_conversions() {
    let table = TableError::EmptySource { source_name: "a.tsv".into() };
    let pipeline: PipelineError = table.into();
    assert!(matches!(pipeline, PipelineError::Table(TableError::EmptySource { .. })));
    assert_eq!(pipeline.error_code(), error_code::EMPTY_SOURCE);

    let storage = StorageError::MigrationFailed { version: 1, message: "boom".into() };
    let pipeline: PipelineError = storage.into();
    assert_eq!(pipeline.error_code(), error_code::MIGRATION_FAILED);

    let compile = CompileError::Io { path: "p".into(), message: "denied".into() };
    let retrieval: RetrievalError = compile.into();
    assert_eq!(retrieval.error_code(), error_code::IO_ERROR);
    let pipeline: PipelineError = retrieval.into();
    assert!(matches!(pipeline, PipelineError::Retrieval(RetrievalError::Artifacts(_))));
}

#[test]
fn test_coded_string_format() {
    let err = TableError::MissingSource { path: "data_raw/hpo/phenotype.hpoa".into() };
    assert_eq!(
        err.coded_string(),
        "[MISSING_SOURCE] Missing source: data_raw/hpo/phenotype.hpoa"
    );
}

#[test]
fn test_empty_query_lists_unknown_terms() {
    let err = RetrievalError::EmptyQuery {
        unknown_terms: vec!["HP:1".into(), "HP:2".into()],
    };
    assert!(err.to_string().contains("HP:1, HP:2"));
}

#[test]
fn test_error_codes_are_unique() {
    let codes = [
        error_code::MISSING_SOURCE,
        error_code::SCHEMA_DETECTION_FAILURE,
        error_code::MALFORMED_RECORD,
        error_code::UNRESOLVED_EDGE,
        error_code::UNKNOWN_QUERY_TERM,
        error_code::EMPTY_QUERY,
        error_code::EMPTY_SOURCE,
        error_code::CONFIG_ERROR,
        error_code::IO_ERROR,
        error_code::XML_ERROR,
        error_code::ARTIFACT_ERROR,
        error_code::STORAGE_ERROR,
        error_code::MIGRATION_FAILED,
    ];
    let unique: HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}

#[test]
fn test_issue_summary_serializes_counts() {
    let mut log = IssueLog::new();
    log.record(RecordIssue::malformed_line("a", 1, "x"));
    log.record(RecordIssue::malformed_line("a", 2, "x"));
    let json = serde_json::to_value(log.summary()).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["by_code"]["MALFORMED_RECORD"], 2);
}
