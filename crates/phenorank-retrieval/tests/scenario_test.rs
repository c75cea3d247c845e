//! End-to-end: tables → compiled artifacts on disk → ranked conditions.

use phenorank_core::errors::{PhenoErrorCode, RetrievalError};
use phenorank_core::models::{Association, Condition, Feature, MatrixVariant, Tables};
use phenorank_matrix::{CompiledArtifacts, IndexCompiler};
use phenorank_retrieval::RetrievalEngine;

fn tables() -> Tables {
    Tables::new(
        vec![Condition::new("C1", "Condition one"), Condition::new("C2", "Condition two")],
        vec![Feature::new("F1", None, 0.1), Feature::new("F2", None, 2.0)],
        vec![
            Association::new("C1", "F1", 1.0),
            Association::new("C1", "F2", 0.5),
            Association::new("C2", "F1", 1.0),
        ],
    )
}

fn engine_from_disk(variant: MatrixVariant) -> RetrievalEngine {
    let dir = tempfile::TempDir::new().unwrap();
    let tables = tables();
    IndexCompiler::new()
        .compile(&tables)
        .artifacts
        .save(dir.path())
        .unwrap();
    let artifacts = CompiledArtifacts::load_variant(dir.path(), variant).unwrap();
    RetrievalEngine::new(&artifacts, variant, &tables).unwrap()
}

#[test]
fn test_single_feature_query_excludes_zero_scores() {
    let engine = engine_from_disk(MatrixVariant::Weight);
    let outcome = engine.retrieve(&["F2"], 2, false).unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].condition_id, "C1");
    assert_eq!(outcome.results[0].score, 0.5);
}

#[test]
fn test_ic_weighted_query_ranks_c1_then_c2() {
    let engine = engine_from_disk(MatrixVariant::Weight);
    let outcome = engine.retrieve(&["F1", "F2"], 2, true).unwrap();
    let ranked: Vec<(&str, f64)> = outcome
        .results
        .iter()
        .map(|r| (r.condition_id.as_str(), r.score))
        .collect();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].0, "C1");
    assert!((ranked[0].1 - 1.1).abs() < 1e-12);
    assert_eq!(ranked[1].0, "C2");
    assert!((ranked[1].1 - 0.1).abs() < 1e-12);
    assert_eq!(outcome.results[1].name, "Condition two");
}

#[test]
fn test_empty_query_error_code() {
    let engine = engine_from_disk(MatrixVariant::WeightNorm);
    let err = engine.retrieve(&["", "  "], 2, false).unwrap_err();
    assert!(matches!(err, RetrievalError::EmptyQuery { ref unknown_terms } if unknown_terms.is_empty()));
    assert_eq!(err.error_code(), "EMPTY_QUERY");
}
