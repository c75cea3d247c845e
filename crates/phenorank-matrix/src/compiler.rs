//! Tables → sparse matrix variants.

use std::collections::BTreeMap;

use phenorank_core::errors::{IssueLog, RecordIssue};
use phenorank_core::models::{MatrixVariant, Tables};
use serde::Serialize;

use crate::artifacts::CompiledArtifacts;
use crate::csr::CsrMatrix;
use crate::ic::align_ic_vector;
use crate::mapping::IndexMapping;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompileReport {
    pub n_rows: usize,
    pub n_cols: usize,
    pub associations: usize,
    /// Edges whose condition or feature is not in the mappings.
    pub dropped_edges: usize,
    /// Edges with a NaN or infinite weight.
    pub invalid_weights: usize,
    /// Columns whose IC was filled with the median.
    pub ic_filled: usize,
    pub nnz: BTreeMap<MatrixVariant, usize>,
    #[serde(skip)]
    pub issues: IssueLog,
}

#[derive(Debug)]
pub struct CompileOutput {
    pub artifacts: CompiledArtifacts,
    pub report: CompileReport,
}

/// Compiles the association relation into every [`MatrixVariant`].
#[derive(Debug, Clone)]
pub struct IndexCompiler {
    variants: Vec<MatrixVariant>,
}

impl Default for IndexCompiler {
    fn default() -> Self {
        Self {
            variants: MatrixVariant::ALL.to_vec(),
        }
    }
}

impl IndexCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict output to `variants`. The raw weight matrix is always built.
    pub fn with_variants(mut self, variants: &[MatrixVariant]) -> Self {
        self.variants = variants.to_vec();
        if !self.variants.contains(&MatrixVariant::Weight) {
            self.variants.push(MatrixVariant::Weight);
        }
        self.variants.sort();
        self.variants.dedup();
        self
    }

    pub fn compile(&self, tables: &Tables) -> CompileOutput {
        let mapping = IndexMapping::from_tables(tables);
        let mut report = CompileReport {
            n_rows: mapping.n_rows(),
            n_cols: mapping.n_cols(),
            associations: tables.associations.len(),
            ..Default::default()
        };

        let mut triplets = Vec::with_capacity(tables.associations.len());
        for a in &tables.associations {
            let (Some(row), Some(col)) = (mapping.row(&a.condition_id), mapping.col(&a.feature_id)) else {
                report.dropped_edges += 1;
                report.issues.record(RecordIssue::UnresolvedEdge {
                    condition_id: a.condition_id.clone(),
                    feature_id: a.feature_id.clone(),
                });
                continue;
            };
            if !a.weight.is_finite() {
                report.invalid_weights += 1;
                continue;
            }
            triplets.push((row, col, a.weight));
        }

        let weight = CsrMatrix::from_triplets(mapping.n_rows(), mapping.n_cols(), triplets);
        let (ic, ic_filled) = align_ic_vector(&mapping, &tables.features);
        report.ic_filled = ic_filled;

        let mut matrices = BTreeMap::new();
        for &variant in &self.variants {
            let matrix = match variant {
                MatrixVariant::Weight => weight.clone(),
                MatrixVariant::WeightNorm => weight.normalize_rows(),
                MatrixVariant::WeightIc => weight.scale_columns(&ic),
                MatrixVariant::WeightIcNorm => weight.scale_columns(&ic).normalize_rows(),
            };
            report.nnz.insert(variant, matrix.nnz());
            matrices.insert(variant, matrix);
        }

        if report.dropped_edges > 0 || report.invalid_weights > 0 {
            tracing::warn!(
                dropped = report.dropped_edges,
                invalid = report.invalid_weights,
                "edges left out of the matrix"
            );
        }
        tracing::info!(
            rows = report.n_rows,
            cols = report.n_cols,
            nnz = weight.nnz(),
            variants = matrices.len(),
            "compiled matrices"
        );

        let artifacts = CompiledArtifacts {
            mapping,
            ic,
            matrices,
            dropped_edges: report.dropped_edges,
            invalid_weights: report.invalid_weights,
        };
        CompileOutput { artifacts, report }
    }
}
