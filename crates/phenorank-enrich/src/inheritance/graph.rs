//! Inheritance extraction over a fully materialized triple graph.

use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use phenorank_core::errors::{EnrichError, IssueLog};
use rustc_hash::FxHashMap;

use super::rdf::{read_triples, Term, Triple, UnboundPrefix, RDFS_LABEL, RDFS_SUBCLASS_OF};
use super::{InheritanceExtractor, InheritanceMap, ModeBinder, RestrictionFacts};
use crate::xml;

/// Loads the whole ontology, then answers the restriction pattern by walking
/// edges. Element names must use declared namespace prefixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphExtractor;

impl InheritanceExtractor for GraphExtractor {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn extract(&self, path: &Path, issues: &mut IssueLog) -> Result<InheritanceMap, EnrichError> {
        let source_name = path.display().to_string();
        let reader = xml::open(path)?;
        let triples = read_triples(reader, &source_name, UnboundPrefix::Reject)?;
        let graph = TripleGraph::from_triples(triples);
        tracing::debug!(
            path = %source_name,
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "materialized ontology graph"
        );
        Ok(graph.inheritance_modes(&source_name, issues))
    }
}

/// Terms as nodes, predicates as edge weights. Edge indices follow document order.
pub(crate) struct TripleGraph {
    graph: DiGraph<Term, String>,
    index: FxHashMap<Term, NodeIndex>,
}

impl TripleGraph {
    pub(crate) fn from_triples(triples: Vec<Triple>) -> Self {
        let mut this = Self {
            graph: DiGraph::new(),
            index: FxHashMap::default(),
        };
        for triple in triples {
            let s = this.node(triple.subject);
            let o = this.node(triple.object);
            this.graph.add_edge(s, o, triple.predicate);
        }
        this
    }

    fn node(&mut self, term: Term) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .index
            .entry(term)
            .or_insert_with_key(|term| graph.add_node(term.clone()))
    }

    /// `(predicate, object)` pairs leaving `node`, earliest statement first.
    fn statements(&self, node: NodeIndex) -> Vec<(&str, NodeIndex)> {
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|e| (e.id(), e.weight().as_str(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges.into_iter().map(|(_, p, target)| (p, target)).collect()
    }

    fn label(&self, iri: &str) -> Option<String> {
        let node = *self.index.get(&Term::Iri(iri.to_string()))?;
        self.statements(node)
            .into_iter()
            .filter(|(p, _)| *p == RDFS_LABEL)
            .find_map(|(_, n)| match &self.graph[n] {
                Term::Literal(text) => Some(text.clone()),
                _ => None,
            })
    }

    fn facts(&self, restriction: NodeIndex) -> RestrictionFacts {
        let mut facts = RestrictionFacts::default();
        for (predicate, object) in self.statements(restriction) {
            if RestrictionFacts::tracks(predicate) {
                facts.observe(predicate, &self.graph[object]);
            }
        }
        facts
    }

    pub(crate) fn inheritance_modes(&self, source_name: &str, issues: &mut IssueLog) -> InheritanceMap {
        let mut binder = ModeBinder::new(source_name, issues);
        for edge in self.graph.edge_references() {
            if edge.weight() != RDFS_SUBCLASS_OF {
                continue;
            }
            let facts = self.facts(edge.target());
            binder.bind(&self.graph[edge.source()], &facts, |mode| self.label(mode));
        }
        binder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::rdf::{OWL_ON_PROPERTY, OWL_SOME_VALUES_FROM};
    use super::*;

    fn iri(s: &str) -> Term {
        Term::Iri(s.to_string())
    }

    fn triple(s: Term, p: &str, o: Term) -> Triple {
        Triple {
            subject: s,
            predicate: p.to_string(),
            object: o,
        }
    }

    #[test]
    fn first_mode_wins_and_label_falls_back_to_tail() {
        let d = iri("http://www.orpha.net/ORDO/Orphanet_558");
        let r1 = Term::Blank("r1".into());
        let r2 = Term::Blank("r2".into());
        let ad = iri("http://www.orpha.net/ORDO/Orphanet_409930");
        let ar = iri("http://www.orpha.net/ORDO/Orphanet_409929");
        let prop = iri("http://www.orpha.net/ORDO/hasInheritance");
        let graph = TripleGraph::from_triples(vec![
            triple(r1.clone(), OWL_ON_PROPERTY, prop.clone()),
            triple(r1.clone(), OWL_SOME_VALUES_FROM, ad.clone()),
            triple(d.clone(), RDFS_SUBCLASS_OF, r1),
            triple(r2.clone(), OWL_ON_PROPERTY, prop),
            triple(r2.clone(), OWL_SOME_VALUES_FROM, ar),
            triple(d, RDFS_SUBCLASS_OF, r2),
            triple(ad, RDFS_LABEL, Term::Literal("Autosomal dominant".into())),
        ]);
        let mut issues = IssueLog::new();
        let modes = graph.inheritance_modes("ordo.owl", &mut issues);
        assert_eq!(modes.len(), 1);
        assert_eq!(modes["ORPHA:558"], "Autosomal dominant");
        assert!(issues.is_clean());
    }

    #[test]
    fn non_inheritance_restrictions_are_ignored() {
        let d = iri("http://www.orpha.net/ORDO/Orphanet_77");
        let r = Term::Blank("r".into());
        let graph = TripleGraph::from_triples(vec![
            triple(r.clone(), OWL_ON_PROPERTY, iri("http://www.orpha.net/ORDO/partOf")),
            triple(r.clone(), OWL_SOME_VALUES_FROM, iri("http://www.orpha.net/ORDO/Orphanet_1")),
            triple(d, RDFS_SUBCLASS_OF, r),
        ]);
        let mut issues = IssueLog::new();
        assert!(graph.inheritance_modes("ordo.owl", &mut issues).is_empty());
        assert!(issues.is_clean());
    }

    #[test]
    fn restriction_without_mode_is_malformed() {
        let d = iri("http://www.orpha.net/ORDO/Orphanet_558");
        let r = Term::Anonymous(1);
        let graph = TripleGraph::from_triples(vec![
            triple(r.clone(), OWL_ON_PROPERTY, iri("http://www.orpha.net/ORDO/hasInheritance")),
            triple(r.clone(), OWL_SOME_VALUES_FROM, Term::Literal("not a class".into())),
            triple(d, RDFS_SUBCLASS_OF, r),
        ]);
        let mut issues = IssueLog::new();
        assert!(graph.inheritance_modes("ordo.owl", &mut issues).is_empty());
        assert_eq!(issues.malformed(), 1);
    }
}
