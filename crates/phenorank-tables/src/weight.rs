//! Weight codec: raw frequency expression → association strength in [0, 1].
//!
//! Decoding never fails. Anything unrecognized resolves to one of the
//! configured defaults.

use std::sync::LazyLock;

use phenorank_core::config::WeightConfig;
use phenorank_core::models::SourceProfile;
use regex::Regex;
use rustc_hash::FxHashMap;

static RATIO_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)$").ok());

static PERCENT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*%$").ok());

#[derive(Debug, Clone)]
pub struct WeightCodec {
    default_weight: f64,
    unknown_band_weight: f64,
    present_weight: f64,
    band_prefix: String,
    bands: FxHashMap<String, f64>,
}

impl WeightCodec {
    /// Codec for one source profile, with config overrides applied.
    pub fn from_config(config: &WeightConfig, profile: SourceProfile) -> Self {
        Self {
            default_weight: config.effective_default_weight(profile),
            unknown_band_weight: config.effective_unknown_band_weight(),
            present_weight: config.effective_present_weight(),
            band_prefix: config.effective_band_prefix().to_string(),
            bands: config.effective_bands().into_iter().collect(),
        }
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    /// Decode a raw frequency token.
    pub fn decode(&self, raw: Option<&str>) -> f64 {
        let token = match raw.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return self.default_weight,
        };

        if let Some(&w) = self.bands.get(token) {
            return w;
        }

        if let Some(caps) = RATIO_RE.as_ref().and_then(|re| re.captures(token)) {
            let n: f64 = caps[1].parse().unwrap_or(f64::NAN);
            let m: f64 = caps[2].parse().unwrap_or(f64::NAN);
            if m <= 0.0 || !m.is_finite() || !n.is_finite() {
                return self.default_weight;
            }
            return clamp_unit(n / m);
        }

        if let Some(caps) = PERCENT_RE.as_ref().and_then(|re| re.captures(token)) {
            return match caps[1].parse::<f64>() {
                Ok(p) => clamp_unit(p / 100.0),
                Err(_) => self.default_weight,
            };
        }

        if token.starts_with(&self.band_prefix) {
            return self.unknown_band_weight;
        }

        self.present_weight
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
