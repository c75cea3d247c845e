//! Schema normalization configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONDITION_MIN_FRACTION, DEFAULT_FEATURE_MIN_FRACTION, DEFAULT_NEGATION_QUALIFIERS,
    FEATURE_ID_PATTERN,
};
use crate::models::{DuplicatePolicy, SourceProfile};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchemaConfig {
    /// Default profile for sources that do not name one. Default: hpo.
    pub profile: Option<SourceProfile>,
    /// Feature identifier grammar. Default: `^HP:\d+$`.
    pub feature_pattern: Option<String>,
    /// Condition identifier grammar. Default: the profile's grammar.
    pub condition_pattern: Option<String>,
    /// Minimum matching fraction for a sniffed feature column. Default: 0.05.
    pub feature_min_fraction: Option<f64>,
    /// Minimum matching fraction for a sniffed condition column. Default: 0.02.
    pub condition_min_fraction: Option<f64>,
    /// Qualifier values that negate an annotation. Default: ["NOT"].
    pub negation_qualifiers: Vec<String>,
    /// How repeated pairs collapse. Default: max.
    pub duplicate_policy: Option<DuplicatePolicy>,
}

impl SchemaConfig {
    pub fn effective_profile(&self) -> SourceProfile {
        self.profile.unwrap_or_default()
    }

    pub fn effective_feature_pattern(&self) -> &str {
        self.feature_pattern.as_deref().unwrap_or(FEATURE_ID_PATTERN)
    }

    /// Condition grammar for `profile`, unless overridden.
    pub fn effective_condition_pattern(&self, profile: SourceProfile) -> &str {
        self.condition_pattern
            .as_deref()
            .unwrap_or_else(|| profile.condition_pattern())
    }

    pub fn effective_feature_min_fraction(&self) -> f64 {
        self.feature_min_fraction.unwrap_or(DEFAULT_FEATURE_MIN_FRACTION)
    }

    pub fn effective_condition_min_fraction(&self) -> f64 {
        self.condition_min_fraction
            .unwrap_or(DEFAULT_CONDITION_MIN_FRACTION)
    }

    /// Upper-cased negation qualifiers.
    pub fn effective_negation_qualifiers(&self) -> Vec<String> {
        if self.negation_qualifiers.is_empty() {
            DEFAULT_NEGATION_QUALIFIERS
                .iter()
                .map(|q| q.to_string())
                .collect()
        } else {
            self.negation_qualifiers
                .iter()
                .map(|q| q.trim().to_ascii_uppercase())
                .collect()
        }
    }

    pub fn effective_duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy.unwrap_or_default()
    }
}
