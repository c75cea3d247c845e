//! Condition–feature edges.

use serde::{Deserialize, Serialize};

/// Evidence that a feature is observed in a condition, with strength in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub condition_id: String,
    pub feature_id: String,
    pub weight: f64,
}

impl Association {
    pub fn new(condition_id: impl Into<String>, feature_id: impl Into<String>, weight: f64) -> Self {
        Self {
            condition_id: condition_id.into(),
            feature_id: feature_id.into(),
            weight,
        }
    }
}
