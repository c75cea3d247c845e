//! Integration tests for the table builder over on-disk fixtures.

use std::path::PathBuf;

use phenorank_core::config::{PhenoConfig, SchemaConfig, WeightConfig};
use phenorank_core::errors::{ColumnRole, TableError};
use phenorank_core::models::SourceProfile;
use phenorank_core::IdGrammar;
use phenorank_tables::diagnostics::diagnose;
use phenorank_tables::{AssociationSource, TableBuilder};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn orpha_builder() -> TableBuilder {
    TableBuilder::new(&SchemaConfig::default(), &WeightConfig::default())
        .unwrap()
        .with_ontology_labels(fixture("hp.json"))
        .with_feature_ic(Some(fixture("feature_ic.tsv")))
}

#[test]
fn test_headerless_registry_dump() {
    let out = orpha_builder()
        .build(&[AssociationSource::new(fixture("orpha_dump.tsv"), SourceProfile::Orpha)])
        .unwrap();
    let t = &out.tables;

    let ids: Vec<_> = t.conditions.iter().map(|c| c.condition_id.as_str()).collect();
    assert_eq!(ids, vec!["ORPHA:166024", "ORPHA:558"]);
    // headerless: no name column can be identified
    assert!(t.conditions.iter().all(|c| c.name.is_empty()));

    let marfan_arachno = t
        .associations
        .iter()
        .find(|a| a.condition_id == "ORPHA:558" && a.feature_id == "HP:0001166")
        .unwrap();
    // max(0.60, 0.90)
    assert_eq!(marfan_arachno.weight, 0.90);
    let blank = t
        .associations
        .iter()
        .find(|a| a.feature_id == "HP:0002650")
        .unwrap();
    assert_eq!(blank.weight, 0.5);

    let s = &out.report.sources[0];
    assert_eq!(s.strategy, "sniffing");
    assert_eq!(s.rows_read, 7);
    assert_eq!(s.malformed_skipped, 2);
    assert_eq!(s.duplicates_collapsed, 1);

    assert_eq!(t.feature("HP:0001166").unwrap().label, "Arachnodactyly");
    assert!(t.feature("HP:0002650").unwrap().has_fallback_label());
    assert_eq!(t.feature("HP:0002650").unwrap().ic, 4.25);
    assert_eq!(out.report.ic.explicit, 1);
    assert_eq!(out.report.ic.estimated, 2);
    assert_eq!(out.report.ic_invalid_explicit, 1);
    assert_eq!(out.report.labels_loaded, 2);
}

#[test]
fn test_hpo_profile_cannot_read_registry_dump() {
    let err = orpha_builder()
        .build(&[AssociationSource::new(fixture("orpha_dump.tsv"), SourceProfile::Hpo)])
        .unwrap_err();
    assert!(matches!(
        err,
        TableError::SchemaDetectionFailure { role: ColumnRole::Condition, .. }
    ));
}

#[test]
fn test_sources_from_config_resolve_profiles() {
    let config = PhenoConfig::from_toml(
        r#"
[schema]
profile = "orpha"

[[paths.sources]]
path = "a.tsv"

[[paths.sources]]
path = "b.tsv"
profile = "hpo"
"#,
    )
    .unwrap();
    let sources = AssociationSource::from_config(&config, std::path::Path::new("/p"));
    assert_eq!(sources[0].profile, SourceProfile::Orpha);
    assert_eq!(sources[1].profile, SourceProfile::Hpo);
    assert_eq!(sources[0].path, PathBuf::from("/p/data_raw/a.tsv"));
}

#[test]
fn test_diagnostics_over_built_tables() {
    let out = orpha_builder()
        .build(&[AssociationSource::new(fixture("orpha_dump.tsv"), SourceProfile::Orpha)])
        .unwrap();
    let d = diagnose(
        &out.tables,
        &IdGrammar::new(r"^HP:\d+$").unwrap(),
        &IdGrammar::new(r"^ORPHA:\d+$").unwrap(),
    );
    assert_eq!(d.condition_prefixes["ORPHA"], 2);
    assert_eq!(d.features_with_fallback_label, 1);
    assert!(d.bad_condition_ids.is_empty());
}
