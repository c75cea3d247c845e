//! Phenotype feature records.

use serde::{Deserialize, Serialize};

/// A phenotype ontology term with its information content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub feature_id: String,
    pub label: String,
    pub ic: f64,
}

impl Feature {
    /// Build a feature, falling back to the id when `label` is absent or blank.
    pub fn new(feature_id: impl Into<String>, label: Option<&str>, ic: f64) -> Self {
        let feature_id = feature_id.into();
        let label = label_or_id(label, &feature_id);
        Self { feature_id, label, ic }
    }

    /// True when no human-readable label was available.
    pub fn has_fallback_label(&self) -> bool {
        self.label == self.feature_id
    }
}

/// `label` trimmed, or `feature_id` when the label is missing or blank.
pub fn label_or_id(label: Option<&str>, feature_id: &str) -> String {
    match label.map(str::trim) {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => feature_id.to_string(),
    }
}
