//! Condition retrieval for phenorank.
//!
//! Scores every condition as the (optionally IC-weighted) sum of its matrix
//! entries over the query's feature columns and returns the top `k` with a
//! nonzero score. Ties break by condition id, so rankings are deterministic.

pub mod engine;
pub mod query;

pub use engine::{RankedCondition, RetrievalEngine, RetrievalOutcome};
pub use query::normalize_query;
