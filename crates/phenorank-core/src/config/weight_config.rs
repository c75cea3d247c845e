//! Weight codec configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BAND_PREFIX, DEFAULT_FREQUENCY_BANDS, DEFAULT_PRESENT_WEIGHT,
    DEFAULT_UNKNOWN_BAND_WEIGHT,
};
use crate::models::SourceProfile;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WeightConfig {
    /// Weight for a missing/blank frequency. Default: the profile's value
    /// (1.0 for hpo, 0.5 for orpha).
    pub default_weight: Option<f64>,
    /// Weight for an unknown coded band. Default: 0.5.
    pub unknown_band_weight: Option<f64>,
    /// Weight for any other non-empty token. Default: 1.0.
    pub present_weight: Option<f64>,
    /// Prefix marking coded bands. Default: `HP:`.
    pub band_prefix: Option<String>,
    /// Coded band → weight. Replaces the built-in table when non-empty.
    pub bands: BTreeMap<String, f64>,
}

impl WeightConfig {
    pub fn effective_default_weight(&self, profile: SourceProfile) -> f64 {
        self.default_weight
            .unwrap_or_else(|| profile.default_missing_weight())
    }

    pub fn effective_unknown_band_weight(&self) -> f64 {
        self.unknown_band_weight.unwrap_or(DEFAULT_UNKNOWN_BAND_WEIGHT)
    }

    pub fn effective_present_weight(&self) -> f64 {
        self.present_weight.unwrap_or(DEFAULT_PRESENT_WEIGHT)
    }

    pub fn effective_band_prefix(&self) -> &str {
        self.band_prefix.as_deref().unwrap_or(DEFAULT_BAND_PREFIX)
    }

    pub fn effective_bands(&self) -> BTreeMap<String, f64> {
        if self.bands.is_empty() {
            DEFAULT_FREQUENCY_BANDS
                .iter()
                .map(|(code, w)| (code.to_string(), *w))
                .collect()
        } else {
            self.bands.clone()
        }
    }
}
