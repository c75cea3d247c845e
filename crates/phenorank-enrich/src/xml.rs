//! quick-xml plumbing shared by the record scanner and the ontology readers.

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use phenorank_core::errors::EnrichError;
use quick_xml::events::{BytesCData, BytesStart, BytesText};
use quick_xml::Reader;

pub(crate) type FileReader = Reader<BufReader<File>>;

/// Open `path` for a forward pass with whitespace-only text trimmed.
pub(crate) fn open(path: &Path) -> Result<FileReader, EnrichError> {
    let file = File::open(path).map_err(|e| EnrichError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(configure(Reader::from_reader(BufReader::new(file))))
}

pub(crate) fn configure<R>(mut reader: Reader<R>) -> Reader<R> {
    reader.config_mut().trim_text(true);
    reader
}

pub(crate) fn syntax_error(source_name: &str, position: u64, err: impl ToString) -> EnrichError {
    EnrichError::Xml {
        path: source_name.to_string(),
        position,
        message: err.to_string(),
    }
}

/// Element name without its namespace prefix.
pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    lossy(e.local_name().as_ref())
}

/// Value of the first attribute whose local name is `local`, unescaped.
pub(crate) fn attribute(e: &BytesStart<'_>, local: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
}

/// Text content, unescaped when possible and raw otherwise.
pub(crate) fn text(t: &BytesText<'_>) -> String {
    match t.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => lossy(t),
    }
}

pub(crate) fn cdata(c: &BytesCData<'_>) -> String {
    lossy(c)
}

pub(crate) fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// In-scope namespace declarations, innermost last.
#[derive(Debug, Default)]
pub(crate) struct Namespaces {
    scopes: Vec<Vec<(String, String)>>,
}

impl Namespaces {
    /// Open a scope with the `xmlns` declarations carried by `e`.
    pub(crate) fn push(&mut self, e: &BytesStart<'_>) {
        let mut decls = Vec::new();
        for attr in e.attributes().flatten() {
            let key = attr.key.as_ref();
            let prefix = if key == b"xmlns" {
                Some(String::new())
            } else {
                key.strip_prefix(b"xmlns:").map(lossy)
            };
            if let (Some(prefix), Ok(uri)) = (prefix, attr.unescape_value()) {
                decls.push((prefix, uri.into_owned()));
            }
        }
        self.scopes.push(decls);
    }

    pub(crate) fn pop(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Expand an element name to a full IRI. Unbound prefixes are kept verbatim.
    pub(crate) fn expand_element(&self, qname: &[u8]) -> String {
        let qname = lossy(qname);
        let (prefix, local) = qname.split_once(':').unwrap_or(("", qname.as_str()));
        match self.lookup(prefix) {
            Some(ns) => format!("{ns}{local}"),
            None => qname.clone(),
        }
    }

    /// The prefix of `qname` when it has one that no scope declares.
    pub(crate) fn unbound_prefix(&self, qname: &[u8]) -> Option<String> {
        let qname = lossy(qname);
        let (prefix, _) = qname.split_once(':')?;
        self.lookup(prefix).is_none().then(|| prefix.to_string())
    }

    /// Expand an attribute name. Unprefixed attributes stay bare.
    pub(crate) fn expand_attribute(&self, qname: &[u8]) -> String {
        let qname = lossy(qname);
        match qname.split_once(':') {
            Some((prefix, local)) => match self.lookup(prefix) {
                Some(ns) => format!("{ns}{local}"),
                None => qname.clone(),
            },
            None => qname,
        }
    }

    /// Value of the attribute whose expanded name is `iri`.
    pub(crate) fn attribute(&self, e: &BytesStart<'_>, iri: &str) -> Option<String> {
        e.attributes()
            .flatten()
            .find(|a| self.expand_attribute(a.key.as_ref()) == iri)
            .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
    }
}
