//! Table normalization for phenorank.
//!
//! Turns heterogeneous raw association sources into the three canonical
//! relations (Condition, Feature, Association):
//! - `reader`: tolerant TSV reading (comments, missing headers, short rows)
//! - `schema`: header-based and content-sniffing column detection
//! - `weight`: raw frequency expression → association strength
//! - `ic`: information content per feature
//! - `labels`: feature labels from the ontology export and helper tables
//! - `builder`: orchestration into `Tables` plus a `BuildReport`
//! - `diagnostics`: null counts and identifier-prefix histograms

pub mod builder;
pub mod diagnostics;
pub mod ic;
pub mod labels;
pub mod reader;
pub mod schema;
pub mod weight;

pub use builder::{AssociationSource, BuildOutput, BuildReport, SourceReport, TableBuilder};
pub use schema::{ChainedStrategy, ColumnMap, HeaderStrategy, SchemaStrategy, SniffingStrategy};
pub use weight::WeightCodec;
