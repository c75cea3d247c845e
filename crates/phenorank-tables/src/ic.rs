//! Information content per feature.
//!
//! `IC(f) = -ln((df(f) + 1) / (N + 1))`, where `df(f)` is the number of
//! distinct conditions listing `f` and `N` the number of distinct
//! conditions. Explicit values from an IC table take precedence.

use std::path::Path;

use phenorank_core::constants::FEATURE_HEADER_ALIASES;
use phenorank_core::errors::{IssueLog, RecordIssue, TableError};
use phenorank_core::models::Association;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::reader::{read_tsv, HeaderMode};

/// Laplace-smoothed IC. Never negative when `df <= n`.
pub fn smoothed_ic(df: usize, n: usize) -> f64 {
    let ic = -(((df + 1) as f64) / ((n + 1) as f64)).ln();
    ic.max(0.0)
}

/// Distinct conditions per feature.
pub fn document_frequencies(associations: &[Association]) -> FxHashMap<&str, usize> {
    let mut seen: FxHashSet<(&str, &str)> = FxHashSet::default();
    let mut df: FxHashMap<&str, usize> = FxHashMap::default();
    for a in associations {
        if seen.insert((a.condition_id.as_str(), a.feature_id.as_str())) {
            *df.entry(a.feature_id.as_str()).or_insert(0) += 1;
        }
    }
    df
}

/// Counts of where each feature's IC came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IcStats {
    pub explicit: usize,
    pub estimated: usize,
}

/// IC for each id in `feature_ids`, in the same order.
pub fn assign_ic(
    feature_ids: &[String],
    associations: &[Association],
    n_conditions: usize,
    explicit: &FxHashMap<String, f64>,
) -> (Vec<f64>, IcStats) {
    let df = document_frequencies(associations);
    let mut stats = IcStats::default();
    let values = feature_ids
        .iter()
        .map(|id| match explicit.get(id) {
            Some(&v) => {
                stats.explicit += 1;
                v
            }
            None => {
                stats.estimated += 1;
                smoothed_ic(df.get(id.as_str()).copied().unwrap_or(0), n_conditions)
            }
        })
        .collect();
    (values, stats)
}

/// Explicit IC values loaded from a `feature_id<TAB>ic` table.
#[derive(Debug, Default)]
pub struct ExplicitIc {
    pub values: FxHashMap<String, f64>,
    /// Rows with a non-finite or negative value; never used.
    pub issues: IssueLog,
}

/// Load an explicit IC table. The header row is required; the id column is
/// found by alias (`feature_id`, `hpo_id`) and the value column by name `ic`,
/// falling back to the first two columns.
pub fn load_explicit_ic(path: &Path) -> Result<ExplicitIc, TableError> {
    let table = read_tsv(path, HeaderMode::FirstLine)?;
    let id_col = table.find_column(FEATURE_HEADER_ALIASES).unwrap_or(0);
    let ic_col = table
        .find_column(&["ic", "information_content"])
        .unwrap_or(if id_col == 0 { 1 } else { 0 });

    let mut out = ExplicitIc::default();
    for row in &table.rows {
        let id = row.cell(id_col).trim();
        if id.is_empty() {
            continue;
        }
        match row.cell(ic_col).trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => {
                out.values.entry(id.to_string()).or_insert(v);
            }
            _ => out.issues.record(RecordIssue::malformed_line(
                &table.source_name,
                row.line,
                format!("invalid IC value `{}` for {id}", row.cell(ic_col).trim()),
            )),
        }
    }
    tracing::info!(
        path = %path.display(),
        loaded = out.values.len(),
        invalid = out.issues.malformed(),
        "loaded explicit IC values"
    );
    Ok(out)
}
