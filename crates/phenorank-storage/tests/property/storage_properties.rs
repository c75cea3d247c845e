//! Property tests for persistence.

use phenorank_core::models::{Association, Condition, Feature, Tables};
use phenorank_storage::Database;
use proptest::prelude::*;

fn tables_strategy() -> impl Strategy<Value = Tables> {
    (
        prop::collection::btree_map(0u32..500, ("[a-z ]{0,12}", prop::option::of("[A-Za-z]{1,8}")), 0..20),
        prop::collection::btree_map(0u32..500, (prop::option::of("[a-z]{1,8}"), 0.0f64..10.0), 0..20),
        prop::collection::vec((0u32..500, 0u32..500, 0.0f64..=1.0), 0..40),
    )
        .prop_map(|(conditions, features, edges)| {
            let conditions = conditions
                .into_iter()
                .map(|(id, (name, category))| {
                    let mut c = Condition::new(format!("ORPHA:{id}"), name);
                    c.category = category;
                    c
                })
                .collect();
            let features = features
                .into_iter()
                .map(|(id, (label, ic))| Feature::new(format!("HP:{id:07}"), label.as_deref(), ic))
                .collect();
            let mut seen = std::collections::BTreeSet::new();
            let associations = edges
                .into_iter()
                .filter(|(c, f, _)| seen.insert((*c, *f)))
                .map(|(c, f, w)| Association::new(format!("ORPHA:{c}"), format!("HP:{f:07}"), w))
                .collect();
            let mut tables = Tables::new(conditions, features, associations);
            tables.sort_entities();
            tables
        })
}

proptest! {
    #[test]
    fn replace_then_load_is_identity(tables in tables_strategy()) {
        let db = Database::open_in_memory().unwrap();
        db.replace_tables(&tables).unwrap();
        prop_assert_eq!(db.load_tables().unwrap(), tables);
    }
}
