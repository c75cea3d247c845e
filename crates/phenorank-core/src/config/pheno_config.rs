//! Top-level phenorank configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{EnrichConfig, PathsConfig, RetrievalConfig, SchemaConfig, WeightConfig};
use crate::errors::ConfigError;
use crate::identifiers::IdGrammar;
use crate::models::{InheritanceStrategy, MatrixVariant, SourceProfile};

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "phenorank.toml";

/// Top-level configuration threaded through every stage.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`PHENORANK_*`)
/// 3. Explicit config file (`--config`), then project config
///    (`phenorank.toml` in project root)
/// 4. User config (`~/.phenorank/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PhenoConfig {
    pub paths: PathsConfig,
    pub schema: SchemaConfig,
    pub weights: WeightConfig,
    pub enrich: EnrichConfig,
    pub retrieval: RetrievalConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Config file merged over the project config. Must exist.
    pub config_file: Option<PathBuf>,
    pub profile: Option<SourceProfile>,
    pub raw_dir: Option<PathBuf>,
    pub processed_dir: Option<PathBuf>,
    pub default_weight: Option<f64>,
    pub inheritance_strategy: Option<InheritanceStrategy>,
    pub top_k: Option<usize>,
    pub variant: Option<MatrixVariant>,
}

impl PhenoConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        ::tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }
        if let Some(path) = cli_overrides.and_then(|c| c.config_file.as_deref()) {
            Self::merge_toml_file(&mut config, path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &PhenoConfig) -> Result<(), ConfigError> {
        let unit = |field: &str, value: Option<f64>| -> Result<(), ConfigError> {
            match value {
                Some(v) if !(0.0..=1.0).contains(&v) => Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                }),
                _ => Ok(()),
            }
        };
        unit("weights.default_weight", config.weights.default_weight)?;
        unit("weights.unknown_band_weight", config.weights.unknown_band_weight)?;
        unit("weights.present_weight", config.weights.present_weight)?;
        for (code, w) in &config.weights.bands {
            unit(&format!("weights.bands.{code}"), Some(*w))?;
        }

        let fraction = |field: &str, value: Option<f64>| -> Result<(), ConfigError> {
            match value {
                Some(v) if !(v > 0.0 && v <= 1.0) => Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be in (0.0, 1.0]".to_string(),
                }),
                _ => Ok(()),
            }
        };
        fraction("schema.feature_min_fraction", config.schema.feature_min_fraction)?;
        fraction("schema.condition_min_fraction", config.schema.condition_min_fraction)?;

        IdGrammar::new(config.schema.effective_feature_pattern())?;
        if let Some(pattern) = &config.schema.condition_pattern {
            IdGrammar::new(pattern)?;
        }

        if config.retrieval.top_k == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "retrieval.top_k".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.enrich.graph_max_bytes == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "enrich.graph_max_bytes".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut PhenoConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: PhenoConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` (or non-empty) value.
    fn merge(base: &mut PhenoConfig, other: &PhenoConfig) {
        // Paths
        if other.paths.raw_dir.is_some() {
            base.paths.raw_dir = other.paths.raw_dir.clone();
        }
        if other.paths.processed_dir.is_some() {
            base.paths.processed_dir = other.paths.processed_dir.clone();
        }
        if other.paths.database.is_some() {
            base.paths.database = other.paths.database.clone();
        }
        if !other.paths.sources.is_empty() {
            base.paths.sources = other.paths.sources.clone();
        }
        if other.paths.ontology_labels.is_some() {
            base.paths.ontology_labels = other.paths.ontology_labels.clone();
        }
        if !other.paths.label_tables.is_empty() {
            base.paths.label_tables = other.paths.label_tables.clone();
        }
        if other.paths.feature_ic.is_some() {
            base.paths.feature_ic = other.paths.feature_ic.clone();
        }
        if other.paths.orpha_dir.is_some() {
            base.paths.orpha_dir = other.paths.orpha_dir.clone();
        }

        // Schema
        if other.schema.profile.is_some() {
            base.schema.profile = other.schema.profile;
        }
        if other.schema.feature_pattern.is_some() {
            base.schema.feature_pattern = other.schema.feature_pattern.clone();
        }
        if other.schema.condition_pattern.is_some() {
            base.schema.condition_pattern = other.schema.condition_pattern.clone();
        }
        if other.schema.feature_min_fraction.is_some() {
            base.schema.feature_min_fraction = other.schema.feature_min_fraction;
        }
        if other.schema.condition_min_fraction.is_some() {
            base.schema.condition_min_fraction = other.schema.condition_min_fraction;
        }
        if !other.schema.negation_qualifiers.is_empty() {
            base.schema.negation_qualifiers = other.schema.negation_qualifiers.clone();
        }
        if other.schema.duplicate_policy.is_some() {
            base.schema.duplicate_policy = other.schema.duplicate_policy;
        }

        // Weights
        if other.weights.default_weight.is_some() {
            base.weights.default_weight = other.weights.default_weight;
        }
        if other.weights.unknown_band_weight.is_some() {
            base.weights.unknown_band_weight = other.weights.unknown_band_weight;
        }
        if other.weights.present_weight.is_some() {
            base.weights.present_weight = other.weights.present_weight;
        }
        if other.weights.band_prefix.is_some() {
            base.weights.band_prefix = other.weights.band_prefix.clone();
        }
        if !other.weights.bands.is_empty() {
            base.weights.bands = other.weights.bands.clone();
        }

        // Enrich
        if other.enrich.classification_glob.is_some() {
            base.enrich.classification_glob = other.enrich.classification_glob.clone();
        }
        if other.enrich.classification_fallback.is_some() {
            base.enrich.classification_fallback = other.enrich.classification_fallback.clone();
        }
        if !other.enrich.prevalence_files.is_empty() {
            base.enrich.prevalence_files = other.enrich.prevalence_files.clone();
        }
        if other.enrich.ontology.is_some() {
            base.enrich.ontology = other.enrich.ontology.clone();
        }
        if other.enrich.inheritance_strategy.is_some() {
            base.enrich.inheritance_strategy = other.enrich.inheritance_strategy;
        }
        if other.enrich.graph_max_bytes.is_some() {
            base.enrich.graph_max_bytes = other.enrich.graph_max_bytes;
        }

        // Retrieval
        if other.retrieval.top_k.is_some() {
            base.retrieval.top_k = other.retrieval.top_k;
        }
        if other.retrieval.variant.is_some() {
            base.retrieval.variant = other.retrieval.variant;
        }
        if other.retrieval.use_ic.is_some() {
            base.retrieval.use_ic = other.retrieval.use_ic;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `PHENORANK_PROFILE`, `PHENORANK_DEFAULT_WEIGHT`, etc.
    /// Unparseable values are ignored with a warning.
    fn apply_env_overrides(config: &mut PhenoConfig) {
        if let Ok(val) = std::env::var("PHENORANK_RAW_DIR") {
            config.paths.raw_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("PHENORANK_PROCESSED_DIR") {
            config.paths.processed_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("PHENORANK_PROFILE") {
            match val.parse::<SourceProfile>() {
                Ok(v) => config.schema.profile = Some(v),
                Err(e) => ::tracing::warn!(error = %e, "ignoring PHENORANK_PROFILE"),
            }
        }
        if let Ok(val) = std::env::var("PHENORANK_DEFAULT_WEIGHT") {
            if let Ok(v) = val.parse::<f64>() {
                config.weights.default_weight = Some(v);
            }
        }
        if let Ok(val) = std::env::var("PHENORANK_INHERITANCE_STRATEGY") {
            match val.parse::<InheritanceStrategy>() {
                Ok(v) => config.enrich.inheritance_strategy = Some(v),
                Err(e) => ::tracing::warn!(error = %e, "ignoring PHENORANK_INHERITANCE_STRATEGY"),
            }
        }
        if let Ok(val) = std::env::var("PHENORANK_TOP_K") {
            if let Ok(v) = val.parse::<usize>() {
                config.retrieval.top_k = Some(v);
            }
        }
        if let Ok(val) = std::env::var("PHENORANK_VARIANT") {
            match val.parse::<MatrixVariant>() {
                Ok(v) => config.retrieval.variant = Some(v),
                Err(e) => ::tracing::warn!(error = %e, "ignoring PHENORANK_VARIANT"),
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut PhenoConfig, cli: &CliOverrides) {
        if let Some(v) = cli.profile {
            config.schema.profile = Some(v);
        }
        if let Some(ref v) = cli.raw_dir {
            config.paths.raw_dir = Some(v.clone());
        }
        if let Some(ref v) = cli.processed_dir {
            config.paths.processed_dir = Some(v.clone());
        }
        if let Some(v) = cli.default_weight {
            config.weights.default_weight = Some(v);
        }
        if let Some(v) = cli.inheritance_strategy {
            config.enrich.inheritance_strategy = Some(v);
        }
        if let Some(v) = cli.top_k {
            config.retrieval.top_k = Some(v);
        }
        if let Some(v) = cli.variant {
            config.retrieval.variant = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user config path: `~/.phenorank/config.toml`.
fn user_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".phenorank").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
