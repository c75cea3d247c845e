//! Condition enrichment orchestration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use phenorank_core::config::PhenoConfig;
use phenorank_core::errors::{IssueLog, PhenoErrorCode};
use phenorank_core::models::{Condition, ConditionAttribute, InheritanceStrategy};
use serde::Serialize;

use crate::documents::DocumentSet;
use crate::inheritance::{select_extractor, GraphExtractor, InheritanceExtractor, StreamingExtractor};
use crate::scanner::{scan_document, RecordSpec, CATEGORY_RECORDS, PREVALENCE_RECORDS};

/// What an enrichment run read and wrote.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichReport {
    /// Documents opened, including ones that later failed.
    pub documents_scanned: usize,
    pub documents_missing: Vec<String>,
    /// Documents that stopped early, as `[CODE] message`.
    pub documents_failed: Vec<String>,
    /// Distinct conditions with a value, per attribute.
    pub values_parsed: BTreeMap<ConditionAttribute, usize>,
    /// Previously empty cells that were written, per attribute.
    pub cells_filled: BTreeMap<ConditionAttribute, usize>,
    pub malformed_skipped: usize,
    /// Extractor used for inheritance, if the ontology was present.
    pub inheritance_strategy: Option<String>,
    #[serde(skip)]
    pub issues: IssueLog,
}

impl EnrichReport {
    pub fn total_filled(&self) -> usize {
        self.cells_filled.values().sum()
    }
}

/// Fills `category`, `prevalence_band` and `inheritance` on conditions that
/// lack them.
#[derive(Debug, Clone)]
pub struct ConditionEnricher {
    documents: DocumentSet,
    strategy: InheritanceStrategy,
    graph_max_bytes: u64,
}

impl ConditionEnricher {
    pub fn new(documents: DocumentSet, strategy: InheritanceStrategy, graph_max_bytes: u64) -> Self {
        Self {
            documents,
            strategy,
            graph_max_bytes,
        }
    }

    /// Enricher over the registry directory named in `config`.
    pub fn from_config(config: &PhenoConfig, root: &Path) -> Self {
        let dir = config.paths.effective_orpha_dir(root);
        Self::new(
            DocumentSet::discover(&dir, &config.enrich),
            config.enrich.effective_inheritance_strategy(),
            config.enrich.effective_graph_max_bytes(),
        )
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn enrich(&self, conditions: &mut [Condition]) -> EnrichReport {
        let mut report = EnrichReport {
            documents_missing: self
                .documents
                .missing
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            ..Default::default()
        };

        if self.documents.is_empty() {
            tracing::info!(
                missing = report.documents_missing.len(),
                "no registry documents present, enrichment skipped"
            );
            return report;
        }

        let mut categories = self.collect(&self.documents.classification, &CATEGORY_RECORDS, &mut report);
        if categories.is_empty() {
            if let Some(fallback) = &self.documents.classification_fallback {
                tracing::info!(path = %fallback.display(), "no categories in primary documents, reading fallback");
                categories = self.collect(std::slice::from_ref(fallback), &CATEGORY_RECORDS, &mut report);
            }
        }
        let prevalence = self.collect(&self.documents.prevalence, &PREVALENCE_RECORDS, &mut report);
        let inheritance = self.inheritance(&mut report);

        for (attribute, values) in [
            (ConditionAttribute::Category, &categories),
            (ConditionAttribute::PrevalenceBand, &prevalence),
            (ConditionAttribute::Inheritance, &inheritance),
        ] {
            let mut filled = 0;
            for condition in conditions.iter_mut() {
                if let Some(value) = values.get(&condition.condition_id) {
                    if condition.fill_if_empty(attribute, value) {
                        filled += 1;
                    }
                }
            }
            report.values_parsed.insert(attribute, values.len());
            report.cells_filled.insert(attribute, filled);
        }
        report.malformed_skipped = report.issues.malformed();

        tracing::info!(
            scanned = report.documents_scanned,
            failed = report.documents_failed.len(),
            categories = categories.len(),
            prevalence = prevalence.len(),
            inheritance = inheritance.len(),
            filled = report.total_filled(),
            malformed = report.malformed_skipped,
            "enrichment complete"
        );
        report
    }

    /// First value per condition across `paths`, in scan order.
    fn collect(&self, paths: &[PathBuf], spec: &RecordSpec, report: &mut EnrichReport) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        for path in paths {
            let outcome = scan_document(path, spec, &mut report.issues);
            report.documents_scanned += 1;
            if let Some(err) = outcome.error {
                tracing::warn!(path = %path.display(), error = %err, "document scan incomplete");
                report.documents_failed.push(err.coded_string());
            }
            for (code, value) in outcome.values {
                values.entry(code).or_insert(value);
            }
        }
        values
    }

    fn inheritance(&self, report: &mut EnrichReport) -> BTreeMap<String, String> {
        let Some(path) = &self.documents.ontology else {
            return BTreeMap::new();
        };
        let extractor = select_extractor(self.strategy, path, self.graph_max_bytes);
        report.documents_scanned += 1;
        let mut issues = IssueLog::new();
        let mut used = extractor.name();
        let outcome = match extractor.extract(path, &mut issues) {
            Err(err) if used == GraphExtractor.name() => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "graph extraction failed, retrying with the streaming extractor"
                );
                issues = IssueLog::new();
                used = StreamingExtractor.name();
                StreamingExtractor.extract(path, &mut issues)
            }
            outcome => outcome,
        };
        report.inheritance_strategy = Some(used.to_string());

        match outcome {
            Ok(modes) => {
                report.issues.merge(issues);
                modes
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    extractor = used,
                    error = %err,
                    "inheritance extraction failed"
                );
                report.documents_failed.push(err.coded_string());
                BTreeMap::new()
            }
        }
    }
}
