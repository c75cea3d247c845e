//! Persistence round trips and reload validation.

use phenorank_core::constants::MAPPINGS_FILE;
use phenorank_core::errors::{CompileError, PhenoErrorCode};
use phenorank_core::models::{Association, Condition, Feature, MatrixVariant, Tables};
use phenorank_matrix::{CompiledArtifacts, IndexCompiler, MappingsDocument};

fn tables() -> Tables {
    Tables::new(
        vec![
            Condition::new("ORPHA:558", "Marfan syndrome"),
            Condition::new("ORPHA:166024", "Al-Gazali type"),
            Condition::new("ORPHA:77", "Aniridia"),
        ],
        vec![
            Feature::new("HP:0001166", Some("Arachnodactyly"), 3.2),
            Feature::new("HP:0000098", Some("Tall stature"), f64::NAN),
            Feature::new("HP:0000526", Some("Aniridia"), 5.0),
        ],
        vec![
            Association::new("ORPHA:558", "HP:0001166", 0.9),
            Association::new("ORPHA:558", "HP:0000098", 0.6),
            Association::new("ORPHA:166024", "HP:0000098", 0.17),
            Association::new("ORPHA:77", "HP:0000526", 1.0),
        ],
    )
}

fn compiled() -> CompiledArtifacts {
    IndexCompiler::new().compile(&tables()).artifacts
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let artifacts = compiled();
    let written = artifacts.save(dir.path()).unwrap();
    assert_eq!(written.len(), 5);
    for variant in MatrixVariant::ALL {
        assert!(dir.path().join(variant.file_name()).is_file());
    }

    let loaded = CompiledArtifacts::load(dir.path()).unwrap();
    assert_eq!(loaded.mapping.condition_ids(), artifacts.mapping.condition_ids());
    assert_eq!(loaded.mapping.feature_ids(), artifacts.mapping.feature_ids());
    assert_eq!(loaded.ic, artifacts.ic);
    assert_eq!(loaded.matrices, artifacts.matrices);
}

#[test]
fn test_mappings_document_contents() {
    let dir = tempfile::TempDir::new().unwrap();
    compiled().save(dir.path()).unwrap();
    let text = std::fs::read_to_string(dir.path().join(MAPPINGS_FILE)).unwrap();
    let doc: MappingsDocument = serde_json::from_str(&text).unwrap();

    assert_eq!(
        doc.row_to_condition_id,
        vec!["ORPHA:166024", "ORPHA:558", "ORPHA:77"]
    );
    assert_eq!(doc.feature_id_to_col["HP:0001166"], 2);
    assert_eq!(doc.meta[&MatrixVariant::Weight].nnz, 4);
    assert_eq!(doc.meta[&MatrixVariant::Weight].n_rows, 3);
    // NaN IC for HP:0000098 filled with the median of 3.2 and 5.0
    assert!((doc.col_ic[0] - 4.1).abs() < 1e-12);
    assert!(text.contains("\"weight_ic_norm\""));
}

#[test]
fn test_load_single_variant() {
    let dir = tempfile::TempDir::new().unwrap();
    compiled().save(dir.path()).unwrap();
    std::fs::remove_file(dir.path().join(MatrixVariant::WeightNorm.file_name())).unwrap();

    let loaded = CompiledArtifacts::load_variant(dir.path(), MatrixVariant::WeightIc).unwrap();
    assert_eq!(loaded.matrices.len(), 1);
    assert!(loaded.matrix(MatrixVariant::WeightIc).is_ok());
    assert!(matches!(
        loaded.matrix(MatrixVariant::Weight),
        Err(CompileError::MissingArtifact { .. })
    ));

    let err = CompiledArtifacts::load(dir.path()).unwrap_err();
    assert!(matches!(err, CompileError::MissingArtifact { .. }));
}

#[test]
fn test_shape_mismatch_is_detected() {
    let dir = tempfile::TempDir::new().unwrap();
    compiled().save(dir.path()).unwrap();

    let path = dir.path().join(MAPPINGS_FILE);
    let mut doc: MappingsDocument =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc.row_to_condition_id.pop();
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    let err = CompiledArtifacts::load_variant(dir.path(), MatrixVariant::Weight).unwrap_err();
    assert!(matches!(err, CompileError::ShapeMismatch { rows: 3, expected_rows: 2, .. }));
}

fn rewrite_mappings(dir: &std::path::Path, edit: impl FnOnce(&mut MappingsDocument)) {
    let path = dir.join(MAPPINGS_FILE);
    let mut doc: MappingsDocument =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    edit(&mut doc);
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
}

#[test]
fn test_unsorted_mapping_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    compiled().save(dir.path()).unwrap();
    rewrite_mappings(dir.path(), |doc| doc.row_to_condition_id.swap(0, 2));

    let err = CompiledArtifacts::load(dir.path()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidMapping { ref message, .. } if message.contains("out of order")));
    assert_eq!(err.error_code(), "ARTIFACT_ERROR");
}

#[test]
fn test_duplicate_feature_id_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    compiled().save(dir.path()).unwrap();
    rewrite_mappings(dir.path(), |doc| {
        let first = doc.col_to_feature_id[0].clone();
        doc.col_to_feature_id[1] = first;
    });

    let err = CompiledArtifacts::load_variant(dir.path(), MatrixVariant::Weight).unwrap_err();
    assert!(matches!(err, CompileError::InvalidMapping { ref message, .. } if message.starts_with("duplicate column id")));
}

#[test]
fn test_corrupt_matrix_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    compiled().save(dir.path()).unwrap();
    std::fs::write(dir.path().join(MatrixVariant::Weight.file_name()), "{\"n_rows\": 3").unwrap();
    let err = CompiledArtifacts::load_variant(dir.path(), MatrixVariant::Weight).unwrap_err();
    assert!(matches!(err, CompileError::Serialization { .. }));
}

#[test]
fn test_missing_directory_is_missing_artifact() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = CompiledArtifacts::load(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, CompileError::MissingArtifact { .. }));
}
