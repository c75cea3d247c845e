//! Human-readable summaries and the saved retrieval table.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use phenorank_core::errors::{IssueLog, PhenoErrorCode, StorageError};
use phenorank_retrieval::RetrievalOutcome;

use crate::pipeline::{BuildSummary, CompileSummary, EnrichSummary};

/// Ranked results as an aligned text table, followed by any unknown codes.
pub fn render_results(outcome: &RetrievalOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "variant {} | terms used: {}",
        outcome.variant,
        outcome.used_terms.join(", ")
    );
    if outcome.results.is_empty() {
        out.push_str("no condition scored above zero\n");
    } else {
        let id_width = outcome
            .results
            .iter()
            .map(|r| r.condition_id.len())
            .max()
            .unwrap_or(0)
            .max("condition_id".len());
        let _ = writeln!(out, "{:>4}  {:<id_width$}  {:>10}  name", "rank", "condition_id", "score");
        for (i, r) in outcome.results.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>4}  {:<id_width$}  {:>10.4}  {}",
                i + 1,
                r.condition_id,
                r.score,
                r.name
            );
        }
    }
    if !outcome.unknown_terms.is_empty() {
        let _ = writeln!(out, "unknown codes: {}", outcome.unknown_terms.join(", "));
    }
    out
}

/// Write `retrieval_<YYYYmmdd_HHMMSS>.tsv` into `dir`.
pub fn save_results<Tz: TimeZone>(
    outcome: &RetrievalOutcome,
    dir: &Path,
    at: &DateTime<Tz>,
) -> Result<PathBuf, StorageError>
where
    Tz::Offset: std::fmt::Display,
{
    let io_err = |path: &Path, e: std::io::Error| StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    let path = dir.join(format!("retrieval_{}.tsv", at.format("%Y%m%d_%H%M%S")));

    let mut content = String::from("rank\tcondition_id\tname\tscore\n");
    for (i, r) in outcome.results.iter().enumerate() {
        let name = r.name.replace(['\t', '\r', '\n'], " ");
        let _ = writeln!(content, "{}\t{}\t{}\t{}", i + 1, r.condition_id, name, r.score);
    }
    std::fs::write(&path, content).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

pub fn render_build(summary: &BuildSummary) -> String {
    let mut out = String::new();
    for s in &summary.report.sources {
        let _ = writeln!(
            out,
            "source {} [{} via {}]: {} rows, {} associations, {} negated, {} malformed, {} duplicates",
            s.source_name,
            s.profile,
            s.strategy,
            s.rows_read,
            s.associations_added,
            s.negated_dropped,
            s.malformed_skipped,
            s.duplicates_collapsed
        );
    }
    let _ = writeln!(
        out,
        "stored {} conditions, {} features, {} associations",
        summary.counts.conditions, summary.counts.features, summary.counts.associations
    );
    let _ = writeln!(
        out,
        "labels loaded: {} | features without label: {} | IC explicit/estimated: {}/{}",
        summary.report.labels_loaded,
        summary.report.features_without_label,
        summary.report.ic.explicit,
        summary.report.ic.estimated
    );
    render_issues(&mut out, &summary.report.issues);
    out
}

pub fn render_enrich(summary: &EnrichSummary) -> String {
    let r = &summary.report;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "documents scanned: {} | missing: {} | failed: {}",
        r.documents_scanned,
        r.documents_missing.len(),
        r.documents_failed.len()
    );
    for failure in &r.documents_failed {
        let _ = writeln!(out, "  {failure}");
    }
    for (attribute, parsed) in &r.values_parsed {
        let filled = r.cells_filled.get(attribute).copied().unwrap_or(0);
        let _ = writeln!(out, "{attribute}: {parsed} parsed, {filled} filled");
    }
    if let Some(strategy) = &r.inheritance_strategy {
        let _ = writeln!(out, "inheritance extractor: {strategy}");
    }
    let _ = writeln!(out, "rows updated: {}", summary.rows_updated);
    render_issues(&mut out, &r.issues);
    out
}

pub fn render_compile(summary: &CompileSummary) -> String {
    let r = &summary.report;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "matrix {}x{} from {} associations ({} dropped, {} invalid weights, {} IC filled)",
        r.n_rows, r.n_cols, r.associations, r.dropped_edges, r.invalid_weights, r.ic_filled
    );
    for (variant, nnz) in &r.nnz {
        let _ = writeln!(out, "  {variant}: nnz {nnz}");
    }
    for path in &summary.written {
        let _ = writeln!(out, "wrote {}", path.display());
    }
    render_issues(&mut out, &r.issues);
    out
}

/// Per-code counts plus the retained samples.
fn render_issues(out: &mut String, issues: &IssueLog) {
    if issues.is_clean() {
        return;
    }
    for (code, n) in issues.counts() {
        let _ = writeln!(out, "issues {code}: {n}");
    }
    for sample in issues.samples() {
        let _ = writeln!(out, "  {}", sample.coded_string());
    }
}
