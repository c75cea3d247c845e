//! Minimal RDF/XML triple reader.
//!
//! Handles the striped node/property syntax the ontology uses: typed node
//! elements with `rdf:about` or `rdf:nodeID`, anonymous nested nodes,
//! `rdf:resource` objects, and literal property text. Property attributes,
//! `rdf:parseType` and reification are ignored.

use std::io::BufRead;

use phenorank_core::errors::EnrichError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::xml::{self, Namespaces};

pub(crate) const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub(crate) const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub(crate) const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub(crate) const OWL_ON_PROPERTY: &str = "http://www.w3.org/2002/07/owl#onProperty";
pub(crate) const OWL_SOME_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#someValuesFrom";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Term {
    Iri(String),
    /// Blank node named by `rdf:nodeID`; may be described in several places.
    Blank(String),
    /// Blank node with no name, described only where it appears.
    Anonymous(usize),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

/// What to do with an element whose namespace prefix is not declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnboundPrefix {
    Reject,
    /// Keep the qualified name as the predicate or type.
    Keep,
}

enum Frame {
    Document,
    Node(Term),
    Property {
        subject: Term,
        predicate: String,
        object: Option<Term>,
        text: String,
    },
}

struct TripleCollector<F> {
    ns: Namespaces,
    unbound: UnboundPrefix,
    frames: Vec<Frame>,
    emit: F,
    next_anonymous: usize,
}

impl<F: FnMut(Triple)> TripleCollector<F> {
    fn rdf(local: &str) -> String {
        format!("{RDF_NS}{local}")
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), String> {
        self.ns.push(e);
        if self.unbound == UnboundPrefix::Reject {
            if let Some(prefix) = self.ns.unbound_prefix(e.name().as_ref()) {
                return Err(format!("unbound namespace prefix '{prefix}'"));
            }
        }
        let name = self.ns.expand_element(e.name().as_ref());

        let parent_subject = match self.frames.last() {
            Some(Frame::Node(subject)) => Some(subject.clone()),
            _ => None,
        };
        let frame = if let Some(subject) = parent_subject {
            let object = self
                .ns
                .attribute(e, &Self::rdf("resource"))
                .map(Term::Iri)
                .or_else(|| self.ns.attribute(e, &Self::rdf("nodeID")).map(Term::Blank));
            Frame::Property {
                subject,
                predicate: name,
                object,
                text: String::new(),
            }
        } else if self.frames.is_empty() && name == Self::rdf("RDF") {
            Frame::Document
        } else {
            self.node(e, name)
        };
        self.frames.push(frame);
        Ok(())
    }

    fn node(&mut self, e: &BytesStart<'_>, name: String) -> Frame {
        let subject = match self.ns.attribute(e, &Self::rdf("about")) {
            Some(about) => Term::Iri(about),
            None => match self.ns.attribute(e, &Self::rdf("nodeID")) {
                Some(id) => Term::Blank(id),
                None => {
                    self.next_anonymous += 1;
                    Term::Anonymous(self.next_anonymous)
                }
            },
        };
        if let Some(Frame::Property { object, .. }) = self.frames.last_mut() {
            if object.is_none() {
                *object = Some(subject.clone());
            }
        }
        if name != Self::rdf("Description") {
            (self.emit)(Triple {
                subject: subject.clone(),
                predicate: Self::rdf("type"),
                object: Term::Iri(name),
            });
        }
        Frame::Node(subject)
    }

    fn text(&mut self, value: &str) {
        if let Some(Frame::Property { text, .. }) = self.frames.last_mut() {
            text.push_str(value);
        }
    }

    fn close(&mut self) {
        self.ns.pop();
        if let Some(Frame::Property {
            subject,
            predicate,
            object,
            text,
        }) = self.frames.pop()
        {
            let object = object.or_else(|| {
                let text = text.trim();
                (!text.is_empty()).then(|| Term::Literal(text.to_string()))
            });
            if let Some(object) = object {
                (self.emit)(Triple {
                    subject,
                    predicate,
                    object,
                });
            }
        }
    }
}

/// Feed every triple in the document to `emit`, in the order its statement
/// closes. A nested node's own statements therefore precede the statement
/// that references it.
pub(crate) fn for_each_triple<R, F>(
    mut reader: Reader<R>,
    source_name: &str,
    unbound: UnboundPrefix,
    emit: F,
) -> Result<(), EnrichError>
where
    R: BufRead,
    F: FnMut(Triple),
{
    let mut collector = TripleCollector {
        ns: Namespaces::default(),
        unbound,
        frames: Vec::new(),
        emit,
        next_anonymous: 0,
    };
    let mut buf = Vec::new();
    loop {
        let opened = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => collector.open(&e),
            Ok(Event::Empty(e)) => {
                let opened = collector.open(&e);
                collector.close();
                opened
            }
            Ok(Event::Text(t)) => {
                collector.text(&xml::text(&t));
                Ok(())
            }
            Ok(Event::CData(c)) => {
                collector.text(&xml::cdata(&c));
                Ok(())
            }
            Ok(Event::End(_)) => {
                collector.close();
                Ok(())
            }
            Ok(Event::Eof) => break,
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(message) = opened {
            return Err(xml::syntax_error(
                source_name,
                reader.buffer_position() as u64,
                message,
            ));
        }
        buf.clear();
    }
    Ok(())
}

/// Every triple in the document, collected.
pub(crate) fn read_triples<R: BufRead>(
    reader: Reader<R>,
    source_name: &str,
    unbound: UnboundPrefix,
) -> Result<Vec<Triple>, EnrichError> {
    let mut triples = Vec::new();
    for_each_triple(reader, source_name, unbound, |t| triples.push(t))?;
    Ok(triples)
}
