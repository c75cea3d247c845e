//! Inheritance modes from the RDF/XML ontology.
//!
//! A condition class `?d` carries an inheritance mode when it has a
//! `rdfs:subClassOf` restriction whose `owl:onProperty` local name contains
//! "inherit" and whose `owl:someValuesFrom` names the mode. The mode's value
//! is its `rdfs:label`, else the tail of its IRI. The first mode found for a
//! condition wins.
//!
//! Two extractors produce the same map from the same triples: [`GraphExtractor`]
//! materializes every triple first, [`StreamingExtractor`] reads the document
//! twice without holding it. [`select_extractor`] picks one from the configured
//! strategy. An inheritance restriction that cannot be bound is recorded as a
//! malformed record, never dropped silently.

pub mod graph;
mod rdf;
pub mod streaming;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use phenorank_core::errors::{EnrichError, IssueLog, RecordIssue};
use phenorank_core::models::InheritanceStrategy;
use regex::Regex;

use rdf::{Term, OWL_ON_PROPERTY, OWL_SOME_VALUES_FROM};

pub use graph::GraphExtractor;
pub use streaming::StreamingExtractor;

/// `ORPHA:<digits>` → inheritance mode label.
pub type InheritanceMap = BTreeMap<String, String>;

/// Reads inheritance modes from one ontology document.
pub trait InheritanceExtractor {
    fn name(&self) -> &'static str;

    /// Restrictions skipped as malformed go to `issues`.
    fn extract(&self, path: &Path, issues: &mut IssueLog) -> Result<InheritanceMap, EnrichError>;
}

/// Choose an extractor. `Auto` uses the graph extractor when the document is
/// no larger than `graph_max_bytes`.
pub fn select_extractor(
    strategy: InheritanceStrategy,
    path: &Path,
    graph_max_bytes: u64,
) -> Box<dyn InheritanceExtractor> {
    match strategy {
        InheritanceStrategy::Graph => Box::new(GraphExtractor),
        InheritanceStrategy::Streaming => Box::new(StreamingExtractor),
        InheritanceStrategy::Auto => {
            let size = std::fs::metadata(path).map(|m| m.len()).ok();
            match size {
                Some(size) if size <= graph_max_bytes => Box::new(GraphExtractor),
                _ => {
                    tracing::info!(
                        path = %path.display(),
                        size = ?size,
                        graph_max_bytes,
                        "ontology exceeds graph budget, streaming"
                    );
                    Box::new(StreamingExtractor)
                }
            }
        }
    }
}

/// What one restriction node states, gathered from its
/// `owl:onProperty` and `owl:someValuesFrom` statements in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RestrictionFacts {
    on_inheritance: bool,
    /// First IRI object of `owl:someValuesFrom`.
    mode: Option<String>,
}

impl RestrictionFacts {
    /// Whether `predicate` is one this type tracks.
    pub(crate) fn tracks(predicate: &str) -> bool {
        predicate == OWL_ON_PROPERTY || predicate == OWL_SOME_VALUES_FROM
    }

    pub(crate) fn observe(&mut self, predicate: &str, object: &Term) {
        let Term::Iri(iri) = object else {
            return;
        };
        if predicate == OWL_ON_PROPERTY {
            self.on_inheritance |= is_inheritance_property(iri);
        } else if predicate == OWL_SOME_VALUES_FROM && self.mode.is_none() {
            self.mode = Some(iri.clone());
        }
    }
}

/// Binds `rdfs:subClassOf` restrictions to conditions, first mode wins.
pub(crate) struct ModeBinder<'a> {
    source_name: &'a str,
    modes: InheritanceMap,
    issues: &'a mut IssueLog,
}

impl<'a> ModeBinder<'a> {
    pub(crate) fn new(source_name: &'a str, issues: &'a mut IssueLog) -> Self {
        Self {
            source_name,
            modes: InheritanceMap::new(),
            issues,
        }
    }

    /// `class rdfs:subClassOf restriction`. `label` resolves a mode IRI.
    pub(crate) fn bind<L>(&mut self, class: &Term, facts: &RestrictionFacts, label: L)
    where
        L: FnOnce(&str) -> Option<String>,
    {
        if !facts.on_inheritance {
            return;
        }
        let code = match class {
            Term::Iri(iri) => condition_code(iri),
            _ => None,
        };
        let Some(code) = code else {
            self.malformed(class, "inheritance restriction on a class without an Orphanet code".to_string());
            return;
        };
        let Some(mode) = facts.mode.as_deref() else {
            self.malformed(class, format!("inheritance restriction on {code} has no someValuesFrom class"));
            return;
        };
        if !self.modes.contains_key(&code) {
            let label = label(mode).unwrap_or_else(|| iri_tail(mode));
            self.modes.insert(code, label);
        }
    }

    fn malformed(&mut self, class: &Term, reason: String) {
        let location = match class {
            Term::Iri(iri) => iri.clone(),
            Term::Blank(id) => format!("node {id}"),
            Term::Anonymous(n) => format!("anonymous node {n}"),
            Term::Literal(text) => format!("literal '{text}'"),
        };
        self.issues.record(RecordIssue::MalformedRecord {
            source_name: self.source_name.to_string(),
            location,
            reason,
        });
    }

    pub(crate) fn finish(self) -> InheritanceMap {
        self.modes
    }
}

static ORPHANET_CLASS_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Orphanet[_#](\d+)$").ok());

/// `ORPHA:<digits>` for a registry class IRI.
pub(crate) fn condition_code(iri: &str) -> Option<String> {
    ORPHANET_CLASS_RE
        .as_ref()
        .and_then(|re| re.captures(iri))
        .and_then(|caps| caps.get(1))
        .map(|m| format!("ORPHA:{}", m.as_str()))
}

/// Local name of a property IRI: after `#`, else after the last `/`.
fn local_part(iri: &str) -> &str {
    match iri.rsplit_once('#') {
        Some((_, local)) => local,
        None => iri.rsplit('/').next().unwrap_or(iri),
    }
}

pub(crate) fn is_inheritance_property(iri: &str) -> bool {
    local_part(iri).to_ascii_lowercase().contains("inherit")
}

/// Fallback label for a mode with no `rdfs:label`.
pub(crate) fn iri_tail(iri: &str) -> String {
    iri.rsplit('/').next().unwrap_or(iri).to_string()
}
