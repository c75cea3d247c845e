//! Enrichment configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLASSIFICATION_FALLBACK, DEFAULT_CLASSIFICATION_GLOB, DEFAULT_GRAPH_MAX_BYTES,
    DEFAULT_ONTOLOGY_FILE, DEFAULT_PREVALENCE_FILES,
};
use crate::models::InheritanceStrategy;

/// Document names are relative to `paths.orpha_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnrichConfig {
    /// Classification documents. Default: `en_product3_*.xml`.
    pub classification_glob: Option<String>,
    /// Secondary classification document. Default: `en_product6.xml`.
    pub classification_fallback: Option<String>,
    /// Prevalence documents, in scan order.
    pub prevalence_files: Vec<String>,
    /// Ontology with inheritance restrictions. Default: `ordo.owl`.
    pub ontology: Option<String>,
    /// Default: auto.
    pub inheritance_strategy: Option<InheritanceStrategy>,
    /// Graph extractor memory budget in bytes. Default: 256 MiB.
    pub graph_max_bytes: Option<u64>,
}

impl EnrichConfig {
    pub fn effective_classification_glob(&self) -> &str {
        self.classification_glob
            .as_deref()
            .unwrap_or(DEFAULT_CLASSIFICATION_GLOB)
    }

    pub fn effective_classification_fallback(&self) -> &str {
        self.classification_fallback
            .as_deref()
            .unwrap_or(DEFAULT_CLASSIFICATION_FALLBACK)
    }

    pub fn effective_prevalence_files(&self) -> Vec<String> {
        if self.prevalence_files.is_empty() {
            DEFAULT_PREVALENCE_FILES.iter().map(|f| f.to_string()).collect()
        } else {
            self.prevalence_files.clone()
        }
    }

    pub fn effective_ontology(&self) -> &str {
        self.ontology.as_deref().unwrap_or(DEFAULT_ONTOLOGY_FILE)
    }

    pub fn effective_inheritance_strategy(&self) -> InheritanceStrategy {
        self.inheritance_strategy.unwrap_or_default()
    }

    pub fn effective_graph_max_bytes(&self) -> u64 {
        self.graph_max_bytes.unwrap_or(DEFAULT_GRAPH_MAX_BYTES)
    }
}
