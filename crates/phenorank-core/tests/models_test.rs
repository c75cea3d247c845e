//! Tests for the canonical relations and option enums.

use phenorank_core::models::*;

fn sample_tables() -> Tables {
    let mut tables = Tables::new(
        vec![
            Condition::new("ORPHA:558", "Marfan syndrome"),
            Condition::new("OMIM:154700", "Marfan syndrome"),
        ],
        vec![
            Feature::new("HP:0001166", Some("Arachnodactyly"), 2.1),
            Feature::new("HP:0000098", None, 0.4),
        ],
        vec![
            Association::new("ORPHA:558", "HP:0001166", 0.9),
            Association::new("OMIM:154700", "HP:0000098", 1.0),
        ],
    );
    tables.sort_entities();
    tables
}

#[test]
fn test_sort_entities_orders_by_id() {
    let tables = sample_tables();
    assert_eq!(tables.conditions[0].condition_id, "OMIM:154700");
    assert_eq!(tables.features[0].feature_id, "HP:0000098");
    // Associations keep insertion order.
    assert_eq!(tables.associations[0].condition_id, "ORPHA:558");
}

#[test]
fn test_lookup_by_id() {
    let tables = sample_tables();
    assert_eq!(tables.condition("ORPHA:558").map(|c| c.name.as_str()), Some("Marfan syndrome"));
    assert!(tables.condition("ORPHA:1").is_none());
    let f = tables.feature("HP:0000098").unwrap();
    assert!(f.has_fallback_label());
    assert_eq!(tables.feature_ic()["HP:0001166"], 2.1);
    assert_eq!(tables.condition_names().len(), 2);
}

#[test]
fn test_variant_names_and_files() {
    let names: Vec<_> = MatrixVariant::ALL.iter().map(|v| v.file_name()).collect();
    assert_eq!(
        names,
        vec!["X_weight.json", "X_weight_norm.json", "X_weight_ic.json", "X_weight_ic_norm.json"]
    );
    for v in MatrixVariant::ALL {
        assert_eq!(v.as_str().parse::<MatrixVariant>().unwrap(), v);
    }
    assert_eq!("weight-ic-norm".parse::<MatrixVariant>().unwrap(), MatrixVariant::WeightIcNorm);
    assert!("dense".parse::<MatrixVariant>().is_err());
}

#[test]
fn test_profile_defaults() {
    assert_eq!(SourceProfile::Hpo.default_missing_weight(), 1.0);
    assert_eq!(SourceProfile::Orpha.default_missing_weight(), 0.5);
    assert_eq!(SourceProfile::Orpha.registry_prefix(), Some("ORPHA"));
    assert_eq!(SourceProfile::Hpo.registry_prefix(), None);
    assert_eq!("Orphanet".parse::<SourceProfile>().unwrap(), SourceProfile::Orpha);
}

#[test]
fn test_duplicate_policy_parsing() {
    assert_eq!("sum_clamped".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::SumClamped);
    assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::Max);
    assert!("median".parse::<DuplicatePolicy>().is_err());
}

#[test]
fn test_condition_serializes_nulls() {
    let c = Condition::new("ORPHA:558", "Marfan syndrome");
    let json = serde_json::to_value(&c).unwrap();
    assert!(json["category"].is_null());
    assert_eq!(json["condition_id"], "ORPHA:558");
}
