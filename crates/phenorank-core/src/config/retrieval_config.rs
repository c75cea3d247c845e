//! Retrieval configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TOP_K;
use crate::models::MatrixVariant;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Default: 10.
    pub top_k: Option<usize>,
    /// Matrix variant to score against. Default: weight.
    pub variant: Option<MatrixVariant>,
    /// Weight query features by IC. Default: false.
    pub use_ic: Option<bool>,
}

impl RetrievalConfig {
    pub fn effective_top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }

    pub fn effective_variant(&self) -> MatrixVariant {
        self.variant.unwrap_or_default()
    }

    pub fn effective_use_ic(&self) -> bool {
        self.use_ic.unwrap_or(false)
    }
}
