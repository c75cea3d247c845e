//! Feature labels from the ontology export and optional helper tables.
//!
//! Sources are consulted in order; the first label seen for an id wins.

use std::path::{Path, PathBuf};

use phenorank_core::errors::TableError;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::reader::{read_tsv, HeaderMode};

const OBO_PURL_MARKER: &str = "/obo/HP_";

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    graphs: Vec<Graph>,
}

#[derive(Debug, Deserialize)]
struct Graph {
    #[serde(default)]
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    lbl: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

/// Accumulated labels plus per-source counts.
#[derive(Debug, Default)]
pub struct LabelSet {
    labels: FxHashMap<String, String>,
    /// (source name, labels contributed)
    pub sources: Vec<(String, usize)>,
}

impl LabelSet {
    pub fn get(&self, feature_id: &str) -> Option<&str> {
        self.labels.get(feature_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Add labels not already present. Returns how many were new.
    pub fn absorb(&mut self, source_name: &str, incoming: FxHashMap<String, String>) -> usize {
        let mut added = 0;
        for (id, label) in incoming {
            if let std::collections::hash_map::Entry::Vacant(e) = self.labels.entry(id) {
                e.insert(label);
                added += 1;
            }
        }
        self.sources.push((source_name.to_string(), added));
        added
    }

    /// Load the ontology document then each table, skipping absent files.
    pub fn load(ontology: Option<&Path>, tables: &[PathBuf]) -> Result<Self, TableError> {
        let mut set = Self::default();
        if let Some(path) = ontology {
            if path.exists() {
                let labels = load_ontology_labels(path)?;
                set.absorb(&path.display().to_string(), labels);
            } else {
                tracing::debug!(path = %path.display(), "ontology label document absent");
            }
        }
        for path in tables {
            if path.exists() {
                let labels = load_label_table(path)?;
                set.absorb(&path.display().to_string(), labels);
            } else {
                tracing::debug!(path = %path.display(), "label table absent");
            }
        }
        tracing::info!(labels = set.len(), sources = set.sources.len(), "loaded feature labels");
        Ok(set)
    }
}

/// `HP:` CURIE for a node id, accepting OBO PURLs as well.
fn feature_curie(id: &str) -> Option<String> {
    let id = id.trim();
    if id.starts_with("HP:") {
        return Some(id.to_string());
    }
    id.rfind(OBO_PURL_MARKER)
        .map(|pos| format!("HP:{}", &id[pos + OBO_PURL_MARKER.len()..]))
}

/// `graphs[].nodes[]` with `id` and `lbl` (or `label`).
pub fn load_ontology_labels(path: &Path) -> Result<FxHashMap<String, String>, TableError> {
    let content = std::fs::read_to_string(path).map_err(|e| TableError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_ontology_labels(&content).map_err(|e| TableError::InvalidLabels {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn parse_ontology_labels(content: &str) -> Result<FxHashMap<String, String>, serde_json::Error> {
    let doc: GraphDocument = serde_json::from_str(content)?;
    let mut labels = FxHashMap::default();
    for node in doc.graphs.iter().flat_map(|g| g.nodes.iter()) {
        let Some(id) = node.id.as_deref().and_then(feature_curie) else {
            continue;
        };
        let label = node
            .lbl
            .as_deref()
            .or(node.label.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty());
        if let Some(label) = label {
            labels.entry(id).or_insert_with(|| label.to_string());
        }
    }
    Ok(labels)
}

/// Helper table with `hpo_id` and `hpo_name` columns. A table without both
/// columns contributes nothing.
pub fn load_label_table(path: &Path) -> Result<FxHashMap<String, String>, TableError> {
    let table = match read_tsv(path, HeaderMode::Detect) {
        Ok(t) => t,
        Err(TableError::EmptySource { .. }) => return Ok(FxHashMap::default()),
        Err(e) => return Err(e),
    };
    let (Some(id_col), Some(name_col)) = (
        table.find_column(&["hpo_id"]),
        table.find_column(&["hpo_name"]),
    ) else {
        tracing::warn!(path = %path.display(), "label table lacks hpo_id/hpo_name columns");
        return Ok(FxHashMap::default());
    };

    let mut labels = FxHashMap::default();
    for row in &table.rows {
        let id = row.cell(id_col).trim();
        let name = row.cell(name_col).trim();
        if !id.starts_with("HP:") || name.is_empty() || name == "-" {
            continue;
        }
        labels
            .entry(id.to_string())
            .or_insert_with(|| name.to_string());
    }
    Ok(labels)
}
