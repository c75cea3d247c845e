//! Whole-relation writes and reads for condition, feature and condition_feature.

use phenorank_core::errors::StorageError;
use phenorank_core::models::{Association, Condition, Feature, Tables};
use rusqlite::{params, Connection};

/// Row counts per relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationCounts {
    pub conditions: usize,
    pub features: usize,
    pub associations: usize,
}

fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// Replace all three relations in one transaction. Either every row lands or
/// the previous contents stay.
pub fn replace_tables(conn: &Connection, tables: &Tables) -> Result<(), StorageError> {
    let tx = conn.unchecked_transaction().map_err(sqlite_err)?;
    tx.execute_batch(
        "DELETE FROM condition_feature;
         DELETE FROM condition;
         DELETE FROM feature;",
    )
    .map_err(sqlite_err)?;

    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT INTO condition (condition_id, name, category, prevalence_band, inheritance)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(sqlite_err)?;
        for c in &tables.conditions {
            stmt.execute(params![
                c.condition_id,
                c.name,
                c.category,
                c.prevalence_band,
                c.inheritance
            ])
            .map_err(sqlite_err)?;
        }

        let mut stmt = tx
            .prepare_cached("INSERT INTO feature (feature_id, label, ic) VALUES (?1, ?2, ?3)")
            .map_err(sqlite_err)?;
        for f in &tables.features {
            let ic = Some(f.ic).filter(|v| v.is_finite());
            stmt.execute(params![f.feature_id, f.label, ic])
                .map_err(sqlite_err)?;
        }

        let mut stmt = tx
            .prepare_cached(
                "INSERT INTO condition_feature (ordinal, condition_id, feature_id, weight)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(sqlite_err)?;
        for (ordinal, a) in tables.associations.iter().enumerate() {
            stmt.execute(params![ordinal as i64, a.condition_id, a.feature_id, a.weight])
                .map_err(sqlite_err)?;
        }
    }

    tx.commit().map_err(sqlite_err)?;
    tracing::info!(
        conditions = tables.conditions.len(),
        features = tables.features.len(),
        associations = tables.associations.len(),
        "tables written"
    );
    Ok(())
}

/// Load all three relations. Conditions and features come back sorted by id,
/// associations in their stored order.
pub fn load_tables(conn: &Connection) -> Result<Tables, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT condition_id, name, category, prevalence_band, inheritance
             FROM condition ORDER BY condition_id",
        )
        .map_err(sqlite_err)?;
    let conditions = stmt
        .query_map([], |row| {
            Ok(Condition {
                condition_id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                prevalence_band: row.get(3)?,
                inheritance: row.get(4)?,
            })
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    let mut stmt = conn
        .prepare_cached("SELECT feature_id, label, ic FROM feature ORDER BY feature_id")
        .map_err(sqlite_err)?;
    let features = stmt
        .query_map([], |row| {
            let ic: Option<f64> = row.get(2)?;
            Ok(Feature {
                feature_id: row.get(0)?,
                label: row.get(1)?,
                ic: ic.unwrap_or(f64::NAN),
            })
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    let mut stmt = conn
        .prepare_cached(
            "SELECT condition_id, feature_id, weight FROM condition_feature ORDER BY ordinal",
        )
        .map_err(sqlite_err)?;
    let associations = stmt
        .query_map([], |row| {
            Ok(Association {
                condition_id: row.get(0)?,
                feature_id: row.get(1)?,
                weight: row.get(2)?,
            })
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    tracing::debug!(
        conditions = conditions.len(),
        features = features.len(),
        associations = associations.len(),
        "tables loaded"
    );
    Ok(Tables::new(conditions, features, associations))
}

/// Write the enrichment attributes of `conditions` back to their rows.
/// Returns the number of rows updated; ids with no row are ignored.
pub fn update_enrichment(conn: &Connection, conditions: &[Condition]) -> Result<usize, StorageError> {
    let tx = conn.unchecked_transaction().map_err(sqlite_err)?;
    let mut updated = 0;
    {
        let mut stmt = tx
            .prepare_cached(
                "UPDATE condition SET category = ?1, prevalence_band = ?2, inheritance = ?3
                 WHERE condition_id = ?4",
            )
            .map_err(sqlite_err)?;
        for c in conditions {
            updated += stmt
                .execute(params![c.category, c.prevalence_band, c.inheritance, c.condition_id])
                .map_err(sqlite_err)?;
        }
    }
    tx.commit().map_err(sqlite_err)?;
    tracing::info!(updated, "enrichment written");
    Ok(updated)
}

pub fn relation_counts(conn: &Connection) -> Result<RelationCounts, StorageError> {
    let count = |table: &str| -> Result<usize, StorageError> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(sqlite_err)
    };
    Ok(RelationCounts {
        conditions: count("condition")?,
        features: count("feature")?,
        associations: count("condition_feature")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn sample() -> Tables {
        let mut marfan = Condition::new("ORPHA:558", "Marfan syndrome");
        marfan.category = Some("Rare genetic disease".to_string());
        Tables::new(
            vec![marfan, Condition::new("ORPHA:77", "Aniridia")],
            vec![
                Feature::new("HP:0001166", Some("Arachnodactyly"), 2.5),
                Feature::new("HP:0000526", None, f64::NAN),
            ],
            vec![
                Association::new("ORPHA:558", "HP:0001166", 0.9),
                Association::new("ORPHA:77", "HP:0000526", 1.0),
                Association::new("ORPHA:558", "HP:0000526", 0.17),
            ],
        )
    }

    #[test]
    fn replace_then_load_keeps_rows_and_order() {
        let conn = setup_db();
        let tables = sample();
        replace_tables(&conn, &tables).unwrap();
        let loaded = load_tables(&conn).unwrap();

        assert_eq!(loaded.associations, tables.associations);
        assert_eq!(loaded.conditions[0].condition_id, "ORPHA:558");
        assert_eq!(loaded.conditions[0].category.as_deref(), Some("Rare genetic disease"));
        assert_eq!(loaded.features[0].feature_id, "HP:0000526");
        assert!(loaded.features[0].ic.is_nan());
        assert_eq!(loaded.features[0].label, "HP:0000526");
        assert_eq!(loaded.features[1].ic, 2.5);
    }

    #[test]
    fn replace_discards_previous_contents() {
        let conn = setup_db();
        replace_tables(&conn, &sample()).unwrap();
        let smaller = Tables::new(vec![Condition::new("ORPHA:1", "x")], vec![], vec![]);
        replace_tables(&conn, &smaller).unwrap();
        assert_eq!(
            relation_counts(&conn).unwrap(),
            RelationCounts {
                conditions: 1,
                features: 0,
                associations: 0
            }
        );
    }

    #[test]
    fn failed_replace_keeps_previous_contents() {
        let conn = setup_db();
        replace_tables(&conn, &sample()).unwrap();
        let duplicate = Tables::new(
            vec![Condition::new("ORPHA:1", "a"), Condition::new("ORPHA:1", "b")],
            vec![],
            vec![],
        );
        assert!(replace_tables(&conn, &duplicate).is_err());
        assert_eq!(relation_counts(&conn).unwrap().conditions, 2);
        assert_eq!(relation_counts(&conn).unwrap().associations, 3);
    }

    #[test]
    fn update_enrichment_touches_only_known_rows() {
        let conn = setup_db();
        replace_tables(&conn, &sample()).unwrap();
        let mut aniridia = Condition::new("ORPHA:77", "Aniridia");
        aniridia.inheritance = Some("Autosomal dominant".to_string());
        let stranger = Condition::new("ORPHA:999", "unknown");
        assert_eq!(update_enrichment(&conn, &[aniridia, stranger]).unwrap(), 1);

        let loaded = load_tables(&conn).unwrap();
        let row = loaded.condition("ORPHA:77").unwrap();
        assert_eq!(row.inheritance.as_deref(), Some("Autosomal dominant"));
        assert_eq!(row.name, "Aniridia");
        assert_eq!(relation_counts(&conn).unwrap().conditions, 2);
    }
}
