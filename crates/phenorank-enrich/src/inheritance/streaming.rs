//! Two-pass streaming inheritance extraction.
//!
//! Both passes read the same triple stream the graph extractor materializes.
//! Pass one keeps the first `rdfs:label` of every IRI and the restriction
//! statements of nodes named by `rdf:about` or `rdf:nodeID`, which may be
//! referenced from anywhere. Pass two binds each `rdfs:subClassOf` to its
//! restriction. An anonymous restriction's statements all close before the
//! statement that references it, so they are held only until then.

use std::io::BufRead;
use std::path::Path;

use phenorank_core::errors::{EnrichError, IssueLog};
use quick_xml::Reader;
use rustc_hash::FxHashMap;

use super::rdf::{for_each_triple, Term, UnboundPrefix, RDFS_LABEL, RDFS_SUBCLASS_OF};
use super::{InheritanceExtractor, InheritanceMap, ModeBinder, RestrictionFacts};
use crate::xml;

/// Reads the ontology twice without holding it. Undeclared namespace
/// prefixes are tolerated.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingExtractor;

impl InheritanceExtractor for StreamingExtractor {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn extract(&self, path: &Path, issues: &mut IssueLog) -> Result<InheritanceMap, EnrichError> {
        let source_name = path.display().to_string();
        let index = collect_index(xml::open(path)?, &source_name)?;
        tracing::debug!(
            path = %source_name,
            labels = index.labels.len(),
            restrictions = index.restrictions.len(),
            "indexed ontology"
        );
        collect_modes(xml::open(path)?, &source_name, &index, issues)
    }
}

/// What pass one learns.
#[derive(Debug, Default)]
pub(crate) struct OntologyIndex {
    labels: FxHashMap<String, String>,
    restrictions: FxHashMap<Term, RestrictionFacts>,
}

pub(crate) fn collect_index<R: BufRead>(reader: Reader<R>, source_name: &str) -> Result<OntologyIndex, EnrichError> {
    let mut index = OntologyIndex::default();
    for_each_triple(reader, source_name, UnboundPrefix::Keep, |t| {
        if t.predicate == RDFS_LABEL {
            if let (Term::Iri(iri), Term::Literal(text)) = (t.subject, t.object) {
                index.labels.entry(iri).or_insert(text);
            }
        } else if RestrictionFacts::tracks(&t.predicate) && !matches!(t.subject, Term::Anonymous(_)) {
            index
                .restrictions
                .entry(t.subject)
                .or_default()
                .observe(&t.predicate, &t.object);
        }
    })?;
    Ok(index)
}

pub(crate) fn collect_modes<R: BufRead>(
    reader: Reader<R>,
    source_name: &str,
    index: &OntologyIndex,
    issues: &mut IssueLog,
) -> Result<InheritanceMap, EnrichError> {
    let mut binder = ModeBinder::new(source_name, issues);
    let mut anonymous: FxHashMap<usize, RestrictionFacts> = FxHashMap::default();
    for_each_triple(reader, source_name, UnboundPrefix::Keep, |t| {
        if let Term::Anonymous(n) = t.subject {
            if RestrictionFacts::tracks(&t.predicate) {
                anonymous.entry(n).or_default().observe(&t.predicate, &t.object);
            }
        }
        let facts = match &t.object {
            Term::Anonymous(n) => anonymous.remove(n),
            named => index.restrictions.get(named).cloned(),
        };
        if t.predicate == RDFS_SUBCLASS_OF {
            if let Some(facts) = facts {
                binder.bind(&t.subject, &facts, |mode| index.labels.get(mode).cloned());
            }
        }
    })?;
    Ok(binder.finish())
}
