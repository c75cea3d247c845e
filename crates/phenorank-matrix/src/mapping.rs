//! Row and column index mappings.

use phenorank_core::models::Tables;
use rustc_hash::FxHashMap;

/// Sorted distinct condition ids as rows, sorted distinct feature ids as columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexMapping {
    row_to_condition_id: Vec<String>,
    col_to_feature_id: Vec<String>,
    condition_id_to_row: FxHashMap<String, usize>,
    feature_id_to_col: FxHashMap<String, usize>,
}

impl IndexMapping {
    pub fn from_tables(tables: &Tables) -> Self {
        Self::new(
            tables.conditions.iter().map(|c| c.condition_id.clone()).collect(),
            tables.features.iter().map(|f| f.feature_id.clone()).collect(),
        )
    }

    /// Sorts and deduplicates both id lists.
    pub fn new(mut condition_ids: Vec<String>, mut feature_ids: Vec<String>) -> Self {
        condition_ids.sort();
        condition_ids.dedup();
        feature_ids.sort();
        feature_ids.dedup();
        Self::build(condition_ids, feature_ids)
    }

    /// Lists read back from an artifact. Lookups rely on strictly ascending
    /// ids, so anything else is rejected with the offending position.
    pub(crate) fn from_sorted(
        row_to_condition_id: Vec<String>,
        col_to_feature_id: Vec<String>,
    ) -> Result<Self, String> {
        check_ascending("row", &row_to_condition_id)?;
        check_ascending("column", &col_to_feature_id)?;
        Ok(Self::build(row_to_condition_id, col_to_feature_id))
    }

    fn build(row_to_condition_id: Vec<String>, col_to_feature_id: Vec<String>) -> Self {
        let condition_id_to_row = row_to_condition_id
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let feature_id_to_col = col_to_feature_id
            .iter()
            .enumerate()
            .map(|(j, id)| (id.clone(), j))
            .collect();
        Self {
            row_to_condition_id,
            col_to_feature_id,
            condition_id_to_row,
            feature_id_to_col,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.row_to_condition_id.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_to_feature_id.len()
    }

    pub fn row(&self, condition_id: &str) -> Option<usize> {
        self.condition_id_to_row.get(condition_id).copied()
    }

    pub fn col(&self, feature_id: &str) -> Option<usize> {
        self.feature_id_to_col.get(feature_id).copied()
    }

    pub fn condition_id(&self, row: usize) -> Option<&str> {
        self.row_to_condition_id.get(row).map(String::as_str)
    }

    pub fn feature_id(&self, col: usize) -> Option<&str> {
        self.col_to_feature_id.get(col).map(String::as_str)
    }

    pub fn condition_ids(&self) -> &[String] {
        &self.row_to_condition_id
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.col_to_feature_id
    }
}

fn check_ascending(axis: &str, ids: &[String]) -> Result<(), String> {
    match ids.windows(2).position(|w| w[0] >= w[1]) {
        None => Ok(()),
        Some(i) if ids[i] == ids[i + 1] => Err(format!("duplicate {axis} id '{}' at index {}", ids[i], i + 1)),
        Some(i) => Err(format!(
            "{axis} ids out of order at index {}: '{}' after '{}'",
            i + 1,
            ids[i + 1],
            ids[i]
        )),
    }
}
