//! Source and artifact locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ASSOCIATION_FILE, DEFAULT_DATABASE_FILE, DEFAULT_LABEL_TABLES, DEFAULT_ONTOLOGY_LABELS,
    DEFAULT_ORPHA_DIR, DEFAULT_PROCESSED_DIR, DEFAULT_RAW_DIR,
};
use crate::models::SourceProfile;

/// One raw association source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path relative to `raw_dir` (or absolute).
    pub path: PathBuf,
    /// Overrides `schema.profile` for this source.
    #[serde(default)]
    pub profile: Option<SourceProfile>,
}

/// Paths are relative to the project root unless absolute; source files are
/// relative to `raw_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw source directory. Default: `data_raw`.
    pub raw_dir: Option<PathBuf>,
    /// Processed artifact directory. Default: `data_proc`.
    pub processed_dir: Option<PathBuf>,
    /// SQLite database. Default: `<processed_dir>/phenorank.db`.
    pub database: Option<PathBuf>,
    /// Association sources. Default: one `hpo/phenotype.hpoa` source.
    pub sources: Vec<SourceConfig>,
    /// Ontology label document. Default: `hpo/hp.json`.
    pub ontology_labels: Option<PathBuf>,
    /// Optional label tables with `hpo_id`/`hpo_name` columns.
    pub label_tables: Vec<PathBuf>,
    /// Optional explicit IC table (`feature_id\tic`).
    pub feature_ic: Option<PathBuf>,
    /// Registry document directory. Default: `orpha`.
    pub orpha_dir: Option<PathBuf>,
}

impl PathsConfig {
    pub fn effective_raw_dir(&self, root: &Path) -> PathBuf {
        resolve(root, self.raw_dir.as_deref().unwrap_or(Path::new(DEFAULT_RAW_DIR)))
    }

    pub fn effective_processed_dir(&self, root: &Path) -> PathBuf {
        resolve(
            root,
            self.processed_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_PROCESSED_DIR)),
        )
    }

    pub fn effective_database(&self, root: &Path) -> PathBuf {
        match &self.database {
            Some(p) => resolve(root, p),
            None => self.effective_processed_dir(root).join(DEFAULT_DATABASE_FILE),
        }
    }

    /// Association sources with paths resolved against `raw_dir`.
    pub fn effective_sources(&self, root: &Path) -> Vec<SourceConfig> {
        let raw = self.effective_raw_dir(root);
        if self.sources.is_empty() {
            return vec![SourceConfig {
                path: raw.join(DEFAULT_ASSOCIATION_FILE),
                profile: None,
            }];
        }
        self.sources
            .iter()
            .map(|s| SourceConfig {
                path: resolve(&raw, &s.path),
                profile: s.profile,
            })
            .collect()
    }

    pub fn effective_ontology_labels(&self, root: &Path) -> PathBuf {
        let raw = self.effective_raw_dir(root);
        resolve(
            &raw,
            self.ontology_labels
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_ONTOLOGY_LABELS)),
        )
    }

    pub fn effective_label_tables(&self, root: &Path) -> Vec<PathBuf> {
        let raw = self.effective_raw_dir(root);
        if self.label_tables.is_empty() {
            DEFAULT_LABEL_TABLES.iter().map(|p| raw.join(p)).collect()
        } else {
            self.label_tables.iter().map(|p| resolve(&raw, p)).collect()
        }
    }

    pub fn effective_feature_ic(&self, root: &Path) -> Option<PathBuf> {
        let raw = self.effective_raw_dir(root);
        self.feature_ic.as_deref().map(|p| resolve(&raw, p))
    }

    pub fn effective_orpha_dir(&self, root: &Path) -> PathBuf {
        let raw = self.effective_raw_dir(root);
        resolve(
            &raw,
            self.orpha_dir.as_deref().unwrap_or(Path::new(DEFAULT_ORPHA_DIR)),
        )
    }
}

/// `path` if absolute, else `base/path`.
fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
