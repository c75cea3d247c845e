//! Retrieval engine over one compiled matrix variant.

use phenorank_core::errors::{IssueLog, RecordIssue, RetrievalError};
use phenorank_core::models::{MatrixVariant, Tables};
use phenorank_matrix::{CompiledArtifacts, CsrMatrix, IndexMapping};
use serde::Serialize;

use crate::query::normalize_query;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCondition {
    pub condition_id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub results: Vec<RankedCondition>,
    /// Normalized codes that resolved to a column, in query order.
    pub used_terms: Vec<String>,
    /// Coefficient applied to each used term.
    pub coefficients: Vec<f64>,
    /// Normalized codes with no column.
    pub unknown_terms: Vec<String>,
    pub variant: MatrixVariant,
    pub issues: IssueLog,
}

pub struct RetrievalEngine {
    variant: MatrixVariant,
    mapping: IndexMapping,
    matrix: CsrMatrix,
    /// Condition name per row.
    names: Vec<String>,
    /// Feature IC per column; 0.0 where unknown.
    ic: Vec<f64>,
}

impl RetrievalEngine {
    /// Engine over `variant` of `artifacts`, with names and IC taken from `tables`.
    pub fn new(
        artifacts: &CompiledArtifacts,
        variant: MatrixVariant,
        tables: &Tables,
    ) -> Result<Self, RetrievalError> {
        let matrix = artifacts.matrix(variant)?.clone();
        let names_by_id = tables.condition_names();
        let ic_by_id = tables.feature_ic();

        let names = artifacts
            .mapping
            .condition_ids()
            .iter()
            .map(|id| names_by_id.get(id.as_str()).copied().unwrap_or_default().to_string())
            .collect();
        let ic = artifacts
            .mapping
            .feature_ids()
            .iter()
            .map(|id| {
                ic_by_id
                    .get(id.as_str())
                    .copied()
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0)
            })
            .collect();

        tracing::debug!(
            variant = %variant,
            rows = matrix.n_rows,
            cols = matrix.n_cols,
            "retrieval engine ready"
        );
        Ok(Self {
            variant,
            mapping: artifacts.mapping.clone(),
            matrix,
            names,
            ic,
        })
    }

    pub fn variant(&self) -> MatrixVariant {
        self.variant
    }

    /// Rank conditions for `query`.
    ///
    /// Codes are trimmed and upper-cased; blanks and repeats are ignored.
    /// Fails with `EmptyQuery` when no code names a known feature.
    pub fn retrieve<S: AsRef<str>>(
        &self,
        query: &[S],
        top_k: usize,
        use_ic: bool,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        let mut issues = IssueLog::new();
        let mut used_terms = Vec::new();
        let mut unknown_terms = Vec::new();
        let mut coefficients = Vec::new();
        let mut x = vec![0.0; self.matrix.n_cols];

        for term in normalize_query(query) {
            match self.mapping.col(&term) {
                Some(col) => {
                    let coef = if use_ic { self.ic[col] } else { 1.0 };
                    x[col] = coef;
                    coefficients.push(coef);
                    used_terms.push(term);
                }
                None => {
                    issues.record(RecordIssue::UnknownQueryTerm { term: term.clone() });
                    unknown_terms.push(term);
                }
            }
        }

        if !unknown_terms.is_empty() {
            tracing::warn!(unknown = ?unknown_terms, "query codes not found, ignored");
        }
        if used_terms.is_empty() {
            return Err(RetrievalError::EmptyQuery { unknown_terms });
        }

        let scores = self.matrix.mul_vec(&x);
        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| self.mapping.condition_ids()[a.0].cmp(&self.mapping.condition_ids()[b.0]))
        });
        ranked.truncate(top_k);

        let results = ranked
            .into_iter()
            .map(|(row, score)| RankedCondition {
                condition_id: self.mapping.condition_ids()[row].clone(),
                name: self.names[row].clone(),
                score,
            })
            .collect();

        Ok(RetrievalOutcome {
            results,
            used_terms,
            coefficients,
            unknown_terms,
            variant: self.variant,
            issues,
        })
    }
}
