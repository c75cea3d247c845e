//! Project root plus resolved configuration.

use std::path::{Path, PathBuf};

use phenorank_core::config::{CliOverrides, PhenoConfig};
use phenorank_core::errors::{ConfigError, StorageError};
use phenorank_storage::Database;

/// Preview exports live under the processed directory.
const PREVIEWS_DIR: &str = "_previews";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: PhenoConfig,
}

impl Workspace {
    /// Resolve configuration for `root`, CLI overrides applied last.
    pub fn load(root: &Path, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let config = PhenoConfig::load(root, Some(overrides))?;
        Ok(Self::new(root, config))
    }

    pub fn new(root: &Path, config: PhenoConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PhenoConfig {
        &self.config
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.config.paths.effective_processed_dir(&self.root)
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.processed_dir().join(PREVIEWS_DIR)
    }

    pub fn database_path(&self) -> PathBuf {
        self.config.paths.effective_database(&self.root)
    }

    pub fn open_database(&self) -> Result<Database, StorageError> {
        Database::open(&self.database_path())
    }
}
