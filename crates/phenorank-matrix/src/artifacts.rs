//! Persisted matrices and mappings.
//!
//! Layout inside the processed directory:
//! - `X_<variant>.json`: one [`CsrMatrix`] per variant
//! - `mappings.json`: a [`MappingsDocument`] with both index mappings, the
//!   aligned IC vector, and per-variant shape metadata

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use phenorank_core::constants::{MAPPINGS_FILE, VERSION};
use phenorank_core::errors::CompileError;
use phenorank_core::models::MatrixVariant;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::csr::CsrMatrix;
use crate::mapping::IndexMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMeta {
    pub n_rows: usize,
    pub n_cols: usize,
    pub nnz: usize,
}

/// On-disk form of the mappings and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingsDocument {
    pub row_to_condition_id: Vec<String>,
    pub col_to_feature_id: Vec<String>,
    pub condition_id_to_row: BTreeMap<String, usize>,
    pub feature_id_to_col: BTreeMap<String, usize>,
    /// IC per column, median-filled.
    #[serde(default)]
    pub col_ic: Vec<f64>,
    pub meta: BTreeMap<MatrixVariant, VariantMeta>,
    #[serde(default)]
    pub dropped_edges: usize,
    #[serde(default)]
    pub invalid_weights: usize,
    #[serde(default)]
    pub generator: String,
}

/// Mappings, IC vector, and the compiled matrix variants.
#[derive(Debug, Clone)]
pub struct CompiledArtifacts {
    pub mapping: IndexMapping,
    pub ic: Vec<f64>,
    pub matrices: BTreeMap<MatrixVariant, CsrMatrix>,
    pub dropped_edges: usize,
    pub invalid_weights: usize,
}

impl CompiledArtifacts {
    pub fn matrix(&self, variant: MatrixVariant) -> Result<&CsrMatrix, CompileError> {
        self.matrices
            .get(&variant)
            .ok_or_else(|| CompileError::MissingArtifact {
                path: variant.file_name(),
            })
    }

    pub fn mappings_document(&self) -> MappingsDocument {
        MappingsDocument {
            row_to_condition_id: self.mapping.condition_ids().to_vec(),
            col_to_feature_id: self.mapping.feature_ids().to_vec(),
            condition_id_to_row: self
                .mapping
                .condition_ids()
                .iter()
                .enumerate()
                .map(|(i, id)| (id.clone(), i))
                .collect(),
            feature_id_to_col: self
                .mapping
                .feature_ids()
                .iter()
                .enumerate()
                .map(|(j, id)| (id.clone(), j))
                .collect(),
            col_ic: self.ic.clone(),
            meta: self
                .matrices
                .iter()
                .map(|(variant, m)| {
                    (
                        *variant,
                        VariantMeta {
                            n_rows: m.n_rows,
                            n_cols: m.n_cols,
                            nnz: m.nnz(),
                        },
                    )
                })
                .collect(),
            dropped_edges: self.dropped_edges,
            invalid_weights: self.invalid_weights,
            generator: format!("phenorank {VERSION}"),
        }
    }

    /// Write every variant plus `mappings.json` into `dir`. Returns the files written.
    pub fn save(&self, dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
        std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        let mut written = Vec::with_capacity(self.matrices.len() + 1);
        for (variant, matrix) in &self.matrices {
            let path = dir.join(variant.file_name());
            write_json(&path, matrix, false)?;
            written.push(path);
        }
        let path = dir.join(MAPPINGS_FILE);
        write_json(&path, &self.mappings_document(), true)?;
        written.push(path);
        tracing::info!(dir = %dir.display(), files = written.len(), "saved compiled artifacts");
        Ok(written)
    }

    /// Load every variant listed in `mappings.json`.
    pub fn load(dir: &Path) -> Result<Self, CompileError> {
        Self::load_variants(dir, None)
    }

    /// Load only `variant`, still validating it against the metadata.
    pub fn load_variant(dir: &Path, variant: MatrixVariant) -> Result<Self, CompileError> {
        Self::load_variants(dir, Some(&[variant]))
    }

    fn load_variants(dir: &Path, only: Option<&[MatrixVariant]>) -> Result<Self, CompileError> {
        let mappings_path = dir.join(MAPPINGS_FILE);
        let doc: MappingsDocument = read_json(&mappings_path)?;
        let (n_rows, n_cols) = (doc.row_to_condition_id.len(), doc.col_to_feature_id.len());
        let mapping = IndexMapping::from_sorted(doc.row_to_condition_id, doc.col_to_feature_id).map_err(|message| {
            CompileError::InvalidMapping {
                path: mappings_path.display().to_string(),
                message,
            }
        })?;

        let wanted: Vec<MatrixVariant> = match only {
            Some(variants) => variants.to_vec(),
            None => doc.meta.keys().copied().collect(),
        };

        let mut matrices = BTreeMap::new();
        for variant in wanted {
            let meta = doc.meta.get(&variant).ok_or_else(|| CompileError::MissingArtifact {
                path: dir.join(variant.file_name()).display().to_string(),
            })?;
            let matrix: CsrMatrix = read_json(&dir.join(variant.file_name()))?;
            validate_variant(variant, &matrix, meta, n_rows, n_cols)?;
            matrices.insert(variant, matrix);
        }

        let ic = if doc.col_ic.is_empty() {
            vec![crate::ic::FALLBACK_IC; n_cols]
        } else if doc.col_ic.len() == n_cols {
            doc.col_ic
        } else {
            return Err(CompileError::InvalidMatrix {
                variant: "col_ic".to_string(),
                message: format!("{} IC values for {} columns", doc.col_ic.len(), n_cols),
            });
        };

        tracing::debug!(dir = %dir.display(), variants = matrices.len(), n_rows, n_cols, "loaded compiled artifacts");
        Ok(Self {
            mapping,
            ic,
            matrices,
            dropped_edges: doc.dropped_edges,
            invalid_weights: doc.invalid_weights,
        })
    }
}

fn validate_variant(
    variant: MatrixVariant,
    matrix: &CsrMatrix,
    meta: &VariantMeta,
    n_rows: usize,
    n_cols: usize,
) -> Result<(), CompileError> {
    if matrix.shape() != (n_rows, n_cols) || (meta.n_rows, meta.n_cols) != (n_rows, n_cols) {
        return Err(CompileError::ShapeMismatch {
            variant: variant.to_string(),
            rows: matrix.n_rows,
            cols: matrix.n_cols,
            expected_rows: n_rows,
            expected_cols: n_cols,
        });
    }
    if matrix.nnz() != meta.nnz {
        return Err(CompileError::InvalidMatrix {
            variant: variant.to_string(),
            message: format!("{} stored values, metadata says {}", matrix.nnz(), meta.nnz),
        });
    }
    matrix.validate().map_err(|message| CompileError::InvalidMatrix {
        variant: variant.to_string(),
        message,
    })
}

fn io_error(path: &Path, e: std::io::Error) -> CompileError {
    CompileError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), CompileError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    let result = if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    };
    result.map_err(|e| CompileError::Serialization {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    writer.flush().map_err(|e| io_error(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CompileError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CompileError::MissingArtifact {
                path: path.display().to_string(),
            })
        }
        Err(e) => return Err(io_error(path, e)),
    };
    serde_json::from_reader(BufReader::new(file)).map_err(|e| CompileError::Serialization {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
