//! The three canonical relations, moved between stages as one unit.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{Association, Condition, Feature};

/// Condition, Feature and Association relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    pub conditions: Vec<Condition>,
    pub features: Vec<Feature>,
    pub associations: Vec<Association>,
}

impl Tables {
    pub fn new(
        conditions: Vec<Condition>,
        features: Vec<Feature>,
        associations: Vec<Association>,
    ) -> Self {
        Self {
            conditions,
            features,
            associations,
        }
    }

    /// condition_id → name.
    pub fn condition_names(&self) -> FxHashMap<&str, &str> {
        self.conditions
            .iter()
            .map(|c| (c.condition_id.as_str(), c.name.as_str()))
            .collect()
    }

    /// feature_id → IC.
    pub fn feature_ic(&self) -> FxHashMap<&str, f64> {
        self.features
            .iter()
            .map(|f| (f.feature_id.as_str(), f.ic))
            .collect()
    }

    /// Lookup by id. Relies on the sorted order produced by `sort_entities`.
    pub fn condition(&self, condition_id: &str) -> Option<&Condition> {
        self.conditions
            .binary_search_by(|c| c.condition_id.as_str().cmp(condition_id))
            .ok()
            .map(|i| &self.conditions[i])
    }

    pub fn feature(&self, feature_id: &str) -> Option<&Feature> {
        self.features
            .binary_search_by(|f| f.feature_id.as_str().cmp(feature_id))
            .ok()
            .map(|i| &self.features[i])
    }

    /// Sort conditions and features by identifier. Associations keep their order.
    pub fn sort_entities(&mut self) {
        self.conditions.sort_by(|a, b| a.condition_id.cmp(&b.condition_id));
        self.features.sort_by(|a, b| a.feature_id.cmp(&b.feature_id));
    }
}
