//! Condition enrichment for phenorank.
//!
//! Fills the nullable Condition attributes from registry documents:
//! - `scanner`: single-pass record scanner over classification and prevalence XML
//! - `documents`: which documents exist and the order they are scanned in
//! - `inheritance`: inheritance modes from the RDF/XML ontology, graph or streaming
//! - `enricher`: orchestration, first-value-wins merge, and the `EnrichReport`
//!
//! Enrichment never overwrites a non-empty attribute, so running it twice is
//! the same as running it once.

pub mod documents;
pub mod enricher;
pub mod inheritance;
pub mod scanner;
mod xml;

pub use documents::DocumentSet;
pub use enricher::{ConditionEnricher, EnrichReport};
pub use inheritance::{
    select_extractor, GraphExtractor, InheritanceExtractor, InheritanceMap, StreamingExtractor,
};
pub use scanner::{RecordSpec, ScanOutcome, CATEGORY_RECORDS, PREVALENCE_RECORDS};
