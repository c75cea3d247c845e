//! Small enums selected through configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HPO_MISSING_WEIGHT, DEFAULT_ORPHA_MISSING_WEIGHT, HPO_CONDITION_ID_PATTERN,
    ORPHA_CONDITION_ID_PATTERN, ORPHA_PREFIX,
};

/// Which family of association source is being normalized.
///
/// Both share the feature grammar; they differ in condition grammar,
/// missing-frequency default, and whether registry codes can be rebuilt
/// from a prefix column plus a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceProfile {
    /// HPO-only pipeline: OMIM/ORPHA/DECIPHER condition codes, explicit headers.
    #[default]
    Hpo,
    /// Registry pipeline: `ORPHA:<digits>` codes, header-less dumps tolerated.
    Orpha,
}

impl SourceProfile {
    pub fn condition_pattern(&self) -> &'static str {
        match self {
            Self::Hpo => HPO_CONDITION_ID_PATTERN,
            Self::Orpha => ORPHA_CONDITION_ID_PATTERN,
        }
    }

    pub fn default_missing_weight(&self) -> f64 {
        match self {
            Self::Hpo => DEFAULT_HPO_MISSING_WEIGHT,
            Self::Orpha => DEFAULT_ORPHA_MISSING_WEIGHT,
        }
    }

    /// Prefix used to rebuild condition codes from split columns, if any.
    pub fn registry_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Hpo => None,
            Self::Orpha => Some(ORPHA_PREFIX),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hpo => "hpo",
            Self::Orpha => "orpha",
        }
    }
}

impl fmt::Display for SourceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hpo" => Ok(Self::Hpo),
            "orpha" | "orphanet" => Ok(Self::Orpha),
            other => Err(format!("unknown source profile: {other}")),
        }
    }
}

/// How repeated raw observations of one (condition, feature) pair collapse
/// into the single canonical edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Strongest reported frequency wins.
    #[default]
    Max,
    /// Arithmetic mean of the observations.
    Mean,
    /// First observation in source order wins.
    First,
    /// Sum of observations, clamped to 1.0.
    SumClamped,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Self::Max),
            "mean" => Ok(Self::Mean),
            "first" => Ok(Self::First),
            "sum-clamped" | "sum_clamped" => Ok(Self::SumClamped),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}

/// Which inheritance extractor to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InheritanceStrategy {
    /// Graph when the document fits the memory budget, streaming otherwise.
    #[default]
    Auto,
    Graph,
    Streaming,
}

impl FromStr for InheritanceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "graph" => Ok(Self::Graph),
            "streaming" | "stream" => Ok(Self::Streaming),
            other => Err(format!("unknown inheritance strategy: {other}")),
        }
    }
}

/// Compiled matrix variants. All share one pair of index mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixVariant {
    /// Raw association weight.
    #[default]
    Weight,
    /// Weight with each row scaled to unit L2 norm.
    WeightNorm,
    /// Weight with each column scaled by the feature's IC.
    WeightIc,
    /// `WeightIc` with each row scaled to unit L2 norm.
    WeightIcNorm,
}

impl MatrixVariant {
    pub const ALL: [MatrixVariant; 4] = [
        MatrixVariant::Weight,
        MatrixVariant::WeightNorm,
        MatrixVariant::WeightIc,
        MatrixVariant::WeightIcNorm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::WeightNorm => "weight_norm",
            Self::WeightIc => "weight_ic",
            Self::WeightIcNorm => "weight_ic_norm",
        }
    }

    /// File name of the persisted matrix.
    pub fn file_name(&self) -> String {
        format!("X_{}.json", self.as_str())
    }
}

impl fmt::Display for MatrixVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatrixVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "weight" => Ok(Self::Weight),
            "weight_norm" => Ok(Self::WeightNorm),
            "weight_ic" | "weightic" => Ok(Self::WeightIc),
            "weight_ic_norm" | "weightic_norm" => Ok(Self::WeightIcNorm),
            other => Err(format!("unknown matrix variant: {other}")),
        }
    }
}
