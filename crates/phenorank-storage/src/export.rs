//! TSV export of the canonical relations.
//!
//! Every file carries a header row. Missing values are written as empty
//! fields; tabs and line breaks inside values become spaces.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use phenorank_core::errors::StorageError;
use phenorank_core::models::Tables;

const CONDITION_HEADER: &[&str] = &["condition_id", "name", "category", "prevalence_band", "inheritance"];
const FEATURE_HEADER: &[&str] = &["feature_id", "label", "ic"];
const ASSOCIATION_HEADER: &[&str] = &["condition_id", "feature_id", "weight"];

/// Paths written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub condition: PathBuf,
    pub feature: PathBuf,
    pub condition_feature: PathBuf,
}

/// Write `condition.tsv`, `feature.tsv` and `condition_feature.tsv` into `dir`.
pub fn export_tables(tables: &Tables, dir: &Path) -> Result<ExportedFiles, StorageError> {
    write_relations(tables, dir, "", usize::MAX)
}

/// Write the first `limit` rows of each relation as `<relation>_preview.tsv`.
pub fn write_previews(tables: &Tables, dir: &Path, limit: usize) -> Result<ExportedFiles, StorageError> {
    write_relations(tables, dir, "_preview", limit)
}

fn write_relations(
    tables: &Tables,
    dir: &Path,
    suffix: &str,
    limit: usize,
) -> Result<ExportedFiles, StorageError> {
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    let files = ExportedFiles {
        condition: dir.join(format!("condition{suffix}.tsv")),
        feature: dir.join(format!("feature{suffix}.tsv")),
        condition_feature: dir.join(format!("condition_feature{suffix}.tsv")),
    };

    write_tsv(
        &files.condition,
        CONDITION_HEADER,
        tables.conditions.iter().take(limit).map(|c| {
            vec![
                c.condition_id.clone(),
                c.name.clone(),
                c.category.clone().unwrap_or_default(),
                c.prevalence_band.clone().unwrap_or_default(),
                c.inheritance.clone().unwrap_or_default(),
            ]
        }),
    )?;
    write_tsv(
        &files.feature,
        FEATURE_HEADER,
        tables.features.iter().take(limit).map(|f| {
            let ic = if f.ic.is_finite() { f.ic.to_string() } else { String::new() };
            vec![f.feature_id.clone(), f.label.clone(), ic]
        }),
    )?;
    write_tsv(
        &files.condition_feature,
        ASSOCIATION_HEADER,
        tables.associations.iter().take(limit).map(|a| {
            vec![a.condition_id.clone(), a.feature_id.clone(), a.weight.to_string()]
        }),
    )?;

    tracing::info!(dir = %dir.display(), suffix, "relations exported");
    Ok(files)
}

fn write_tsv(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<(), StorageError> {
    let file = File::create(path).map_err(|e| io_err(path, e))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", header.join("\t")).map_err(|e| io_err(path, e))?;
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| clean(v)).collect();
        writeln!(out, "{}", line.join("\t")).map_err(|e| io_err(path, e))?;
    }
    out.flush().map_err(|e| io_err(path, e))
}

fn clean(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

fn io_err(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
