//! Registry document discovery.

use std::path::{Path, PathBuf};

use phenorank_core::config::EnrichConfig;

/// The documents one enrichment run will read, in scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSet {
    /// Primary classification documents, sorted by file name.
    pub classification: Vec<PathBuf>,
    /// Read only when the primary documents yield no category.
    pub classification_fallback: Option<PathBuf>,
    pub prevalence: Vec<PathBuf>,
    pub ontology: Option<PathBuf>,
    /// Expected documents that were not found.
    pub missing: Vec<PathBuf>,
}

impl DocumentSet {
    /// Locate documents under `dir` using the configured names.
    pub fn discover(dir: &Path, config: &EnrichConfig) -> Self {
        let mut set = Self::default();

        let pattern = config.effective_classification_glob();
        set.classification = glob_sorted(dir, pattern);
        if set.classification.is_empty() {
            set.missing.push(dir.join(pattern));
        }

        set.classification_fallback = existing(dir, config.effective_classification_fallback(), &mut set.missing);
        for name in config.effective_prevalence_files() {
            if let Some(path) = existing(dir, &name, &mut set.missing) {
                set.prevalence.push(path);
            }
        }
        set.ontology = existing(dir, config.effective_ontology(), &mut set.missing);

        tracing::debug!(
            dir = %dir.display(),
            classification = set.classification.len(),
            prevalence = set.prevalence.len(),
            ontology = set.ontology.is_some(),
            missing = set.missing.len(),
            "discovered registry documents"
        );
        set
    }

    /// True when there is nothing to read at all.
    pub fn is_empty(&self) -> bool {
        self.classification.is_empty()
            && self.classification_fallback.is_none()
            && self.prevalence.is_empty()
            && self.ontology.is_none()
    }

    pub fn present(&self) -> usize {
        self.classification.len()
            + usize::from(self.classification_fallback.is_some())
            + self.prevalence.len()
            + usize::from(self.ontology.is_some())
    }
}

fn existing(dir: &Path, name: &str, missing: &mut Vec<PathBuf>) -> Option<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Some(path)
    } else {
        missing.push(path);
        None
    }
}

/// Files in `dir` matching `pattern`, sorted by path.
fn glob_sorted(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let paths = match glob::glob(&full) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!(pattern = %full, error = %e, "invalid classification pattern");
            return Vec::new();
        }
    };
    let mut found: Vec<PathBuf> = paths.flatten().filter(|p| p.is_file()).collect();
    found.sort();
    found
}
