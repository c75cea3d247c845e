//! Index compilation for phenorank.
//!
//! - `mapping`: row ↔ condition id and column ↔ feature id
//! - `csr`: compressed sparse row matrix with deterministic construction
//! - `ic`: IC vector aligned to the column mapping
//! - `compiler`: `Tables` → four matrix variants plus a `CompileReport`
//! - `artifacts`: JSON persistence and validated reload

pub mod artifacts;
pub mod compiler;
pub mod csr;
pub mod ic;
pub mod mapping;

pub use artifacts::{CompiledArtifacts, MappingsDocument, VariantMeta};
pub use compiler::{CompileOutput, CompileReport, IndexCompiler};
pub use csr::CsrMatrix;
pub use ic::align_ic_vector;
pub use mapping::IndexMapping;
