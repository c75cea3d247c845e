//! Single-pass record scanner for registry XML documents.
//!
//! A record element collects the first registry code element inside it and
//! the first value element that yields non-empty text. A value element's text
//! is that of its direct `Name`/`Label` child when present, else its own.
//! Records nest: an inner record with its own code is emitted when it closes,
//! and one without a code hands its value to the record around it.

use std::io::BufRead;
use std::path::Path;

use phenorank_core::constants::ORPHA_PREFIX;
use phenorank_core::errors::{EnrichError, IssueLog, RecordIssue};
use phenorank_core::identifiers::normalize_registry_code;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::xml;

/// Element names that drive one kind of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpec {
    /// What the value means; used in issue reasons.
    pub attribute: &'static str,
    pub record_elements: &'static [&'static str],
    pub code_element: &'static str,
    pub value_elements: &'static [&'static str],
}

/// Disorder classification documents.
pub const CATEGORY_RECORDS: RecordSpec = RecordSpec {
    attribute: "category",
    record_elements: &["Disorder"],
    code_element: "OrphaCode",
    value_elements: &["DisorderGroup", "Group", "Classification", "ClassificationNode"],
};

/// Epidemiology documents.
pub const PREVALENCE_RECORDS: RecordSpec = RecordSpec {
    attribute: "prevalence",
    record_elements: &["Disorder", "PrevalenceList"],
    code_element: "OrphaCode",
    value_elements: &["PrevalenceClass", "Prevalence", "Label"],
};

const LABEL_CHILDREN: &[&str] = &["Name", "Label"];

/// Result of scanning one document.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// `(condition_id, value)` in the order records close; repeats are kept.
    pub values: Vec<(String, String)>,
    /// Record elements closed, valid or not.
    pub records: usize,
    /// Set when the scan stopped early. Values collected before the error are kept.
    pub error: Option<EnrichError>,
}

/// Scan the document at `path`.
pub fn scan_document(path: &Path, spec: &RecordSpec, issues: &mut IssueLog) -> ScanOutcome {
    match xml::open(path) {
        Ok(reader) => scan(reader, &path.display().to_string(), spec, issues),
        Err(e) => ScanOutcome {
            error: Some(e),
            ..Default::default()
        },
    }
}

/// Scan an in-memory document.
pub fn scan_str(source_name: &str, content: &str, spec: &RecordSpec, issues: &mut IssueLog) -> ScanOutcome {
    scan(xml::configure(Reader::from_str(content)), source_name, spec, issues)
}

fn scan<R: BufRead>(
    mut reader: Reader<R>,
    source_name: &str,
    spec: &RecordSpec,
    issues: &mut IssueLog,
) -> ScanOutcome {
    let mut state = ScanState::new(spec, source_name);
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                state.open(&xml::local_name(&e), depth, position);
            }
            Ok(Event::Empty(e)) => {
                state.open(&xml::local_name(&e), depth + 1, position);
                state.close(depth + 1, issues);
            }
            Ok(Event::Text(t)) => state.text(&xml::text(&t), depth),
            Ok(Event::CData(c)) => state.text(&xml::cdata(&c), depth),
            Ok(Event::End(_)) => {
                state.close(depth, issues);
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let position = reader.buffer_position() as u64;
                tracing::warn!(
                    source = source_name,
                    position,
                    error = %e,
                    "XML syntax error, stopping document scan"
                );
                state.outcome.error = Some(xml::syntax_error(source_name, position, e));
                break;
            }
        }
        buf.clear();
    }

    tracing::debug!(
        source = source_name,
        attribute = spec.attribute,
        records = state.outcome.records,
        values = state.outcome.values.len(),
        "scanned document"
    );
    state.outcome
}

#[derive(Debug)]
struct OpenRecord {
    depth: usize,
    position: u64,
    code: Option<String>,
    value: Option<String>,
}

/// A value element being read, owned by the record at `owner` in the stack.
#[derive(Debug)]
struct ValueCapture {
    depth: usize,
    owner: usize,
    own: String,
    label: Option<String>,
    label_depth: Option<usize>,
    label_text: String,
}

impl ValueCapture {
    fn new(depth: usize, owner: usize) -> Self {
        Self {
            depth,
            owner,
            own: String::new(),
            label: None,
            label_depth: None,
            label_text: String::new(),
        }
    }

    fn value(self) -> Option<String> {
        self.label.or_else(|| {
            let own = self.own.trim();
            (!own.is_empty()).then(|| own.to_string())
        })
    }
}

#[derive(Debug)]
struct CodeCapture {
    depth: usize,
    owner: usize,
    text: String,
}

struct ScanState<'a> {
    spec: &'a RecordSpec,
    source_name: &'a str,
    /// Open records, innermost last.
    records: Vec<OpenRecord>,
    code_capture: Option<CodeCapture>,
    captures: Vec<ValueCapture>,
    outcome: ScanOutcome,
}

impl<'a> ScanState<'a> {
    fn new(spec: &'a RecordSpec, source_name: &'a str) -> Self {
        Self {
            spec,
            source_name,
            records: Vec::new(),
            code_capture: None,
            captures: Vec::new(),
            outcome: ScanOutcome::default(),
        }
    }

    fn open(&mut self, name: &str, depth: usize, position: u64) {
        if self.spec.record_elements.contains(&name) {
            self.records.push(OpenRecord {
                depth,
                position,
                code: None,
                value: None,
            });
            return;
        }
        let Some(record) = self.records.last() else {
            return;
        };
        let owner = self.records.len() - 1;

        if name == self.spec.code_element && record.code.is_none() && self.code_capture.is_none() {
            self.code_capture = Some(CodeCapture {
                depth,
                owner,
                text: String::new(),
            });
        } else if record.value.is_none() && self.spec.value_elements.contains(&name) {
            self.captures.push(ValueCapture::new(depth, owner));
        } else if let Some(capture) = self.captures.last_mut() {
            if depth == capture.depth + 1
                && capture.label.is_none()
                && capture.label_depth.is_none()
                && LABEL_CHILDREN.contains(&name)
            {
                capture.label_depth = Some(depth);
                capture.label_text.clear();
            }
        }
    }

    fn text(&mut self, text: &str, depth: usize) {
        if let Some(code) = self.code_capture.as_mut() {
            if code.depth == depth {
                code.text.push_str(text);
            }
            return;
        }
        if let Some(capture) = self.captures.last_mut() {
            if capture.label_depth == Some(depth) {
                capture.label_text.push_str(text);
            } else if capture.depth == depth {
                capture.own.push_str(text);
            }
        }
    }

    fn close(&mut self, depth: usize, issues: &mut IssueLog) {
        if self.code_capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(code) = self.code_capture.take() {
                if let Some(record) = self.records.get_mut(code.owner) {
                    record.code.get_or_insert(code.text);
                }
            }
            return;
        }

        if let Some(capture) = self.captures.last_mut() {
            if capture.label_depth == Some(depth) {
                capture.label_depth = None;
                let label = capture.label_text.trim();
                if !label.is_empty() {
                    capture.label = Some(label.to_string());
                }
                return;
            }
            if capture.depth == depth {
                if let Some(capture) = self.captures.pop() {
                    let owner = capture.owner;
                    if let (Some(value), Some(record)) = (capture.value(), self.records.get_mut(owner)) {
                        record.value.get_or_insert(value);
                    }
                }
                return;
            }
        }

        if self.records.last().is_some_and(|r| r.depth == depth) {
            if let Some(record) = self.records.pop() {
                let remaining = self.records.len();
                self.captures.retain(|c| c.owner < remaining);
                if self.code_capture.as_ref().is_some_and(|c| c.owner >= remaining) {
                    self.code_capture = None;
                }
                self.finish(record, issues);
            }
        }
    }

    fn finish(&mut self, record: OpenRecord, issues: &mut IssueLog) {
        if record.code.is_none() {
            if let Some(parent) = self.records.last_mut() {
                // a codeless inner record, such as a prevalence list, describes its parent
                if let Some(value) = record.value {
                    parent.value.get_or_insert(value);
                }
                return;
            }
        }

        self.outcome.records += 1;
        let location = format!("byte {}", record.position);
        let code = record
            .code
            .as_deref()
            .and_then(|raw| normalize_registry_code(ORPHA_PREFIX, raw));

        match (code, record.value) {
            (Some(code), Some(value)) => self.outcome.values.push((code, value)),
            (None, _) => issues.record(RecordIssue::MalformedRecord {
                source_name: self.source_name.to_string(),
                location,
                reason: match record.code {
                    Some(raw) => format!("invalid {} '{}'", self.spec.code_element, raw.trim()),
                    None => format!("missing {}", self.spec.code_element),
                },
            }),
            (Some(code), None) => issues.record(RecordIssue::MalformedRecord {
                source_name: self.source_name.to_string(),
                location,
                reason: format!("no {} value for {code}", self.spec.attribute),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_category(xml: &str) -> (ScanOutcome, IssueLog) {
        let mut issues = IssueLog::new();
        let outcome = scan_str("product3.xml", xml, &CATEGORY_RECORDS, &mut issues);
        (outcome, issues)
    }

    #[test]
    fn reads_name_child_of_value_element() {
        let (outcome, issues) = scan_category(
            r#"<JDBOR><DisorderList>
                <Disorder id="17601">
                  <OrphaCode>558</OrphaCode>
                  <Name lang="en">Marfan syndrome</Name>
                  <DisorderGroup id="36547"><Name lang="en">Disorder</Name></DisorderGroup>
                </Disorder>
              </DisorderList></JDBOR>"#,
        );
        assert!(outcome.error.is_none());
        assert!(issues.is_clean());
        assert_eq!(outcome.values, vec![("ORPHA:558".to_string(), "Disorder".to_string())]);
    }

    #[test]
    fn falls_back_to_own_text() {
        let (outcome, _) = scan_category(
            "<Disorder><OrphaCode>ORPHA:166024</OrphaCode><Group> Group of disorders </Group></Disorder>",
        );
        assert_eq!(outcome.values[0].1, "Group of disorders");
    }

    #[test]
    fn nested_value_elements_resolve_innermost_first() {
        let mut issues = IssueLog::new();
        let outcome = scan_str(
            "product4.xml",
            r#"<Disorder><OrphaCode>558</OrphaCode>
                 <PrevalenceList count="2">
                   <Prevalence>
                     <PrevalenceType><Name>Point prevalence</Name></PrevalenceType>
                     <PrevalenceClass><Name>1-5 / 10 000</Name></PrevalenceClass>
                   </Prevalence>
                   <Prevalence>
                     <PrevalenceClass><Name>&lt;1 / 1 000 000</Name></PrevalenceClass>
                   </Prevalence>
                 </PrevalenceList>
               </Disorder>"#,
            &PREVALENCE_RECORDS,
            &mut issues,
        );
        assert_eq!(outcome.records, 1);
        assert_eq!(outcome.values, vec![("ORPHA:558".to_string(), "1-5 / 10 000".to_string())]);
    }

    #[test]
    fn nested_disorders_are_emitted_separately() {
        let (outcome, issues) = scan_category(
            "<Disorder><OrphaCode>1</OrphaCode><DisorderGroup><Name>A</Name></DisorderGroup>\
             <X><Disorder><OrphaCode>2</OrphaCode><DisorderGroup><Name>B</Name></DisorderGroup></Disorder></X>\
             </Disorder>",
        );
        assert!(issues.is_clean());
        assert_eq!(outcome.records, 2);
        assert!(outcome.values.contains(&("ORPHA:1".to_string(), "A".to_string())));
        assert!(outcome.values.contains(&("ORPHA:2".to_string(), "B".to_string())));
    }

    #[test]
    fn inner_record_does_not_lend_its_value_to_outer() {
        let (outcome, issues) = scan_category(
            "<Disorder><OrphaCode>1</OrphaCode>\
             <Disorder><OrphaCode>2</OrphaCode><DisorderGroup><Name>B</Name></DisorderGroup></Disorder>\
             </Disorder>",
        );
        assert_eq!(outcome.values, vec![("ORPHA:2".to_string(), "B".to_string())]);
        assert_eq!(issues.malformed(), 1);
    }

    #[test]
    fn malformed_records_are_counted() {
        let (outcome, issues) = scan_category(
            r#"<List>
                 <Disorder><OrphaCode>abc</OrphaCode><DisorderGroup><Name>Disorder</Name></DisorderGroup></Disorder>
                 <Disorder><DisorderGroup><Name>Disorder</Name></DisorderGroup></Disorder>
                 <Disorder><OrphaCode>99</OrphaCode><DisorderGroup><Name> </Name></DisorderGroup></Disorder>
                 <Disorder><OrphaCode>100</OrphaCode><DisorderGroup><Name>Subtype of disorder</Name></DisorderGroup></Disorder>
               </List>"#,
        );
        assert_eq!(outcome.records, 4);
        assert_eq!(issues.malformed(), 3);
        assert_eq!(outcome.values, vec![("ORPHA:100".to_string(), "Subtype of disorder".to_string())]);
    }

    #[test]
    fn syntax_error_keeps_earlier_values() {
        let (outcome, _) = scan_category(
            "<List><Disorder><OrphaCode>1</OrphaCode><Group>A</Group></Disorder><Disorder><OrphaCode>2</Orpha></Disorder></List>",
        );
        assert_eq!(outcome.values.len(), 1);
        assert!(matches!(outcome.error, Some(EnrichError::Xml { .. })));
    }

    #[test]
    fn missing_document_is_io_error() {
        let mut issues = IssueLog::new();
        let outcome = scan_document(Path::new("/nonexistent/en_product4.xml"), &PREVALENCE_RECORDS, &mut issues);
        assert!(matches!(outcome.error, Some(EnrichError::Io { .. })));
        assert!(outcome.values.is_empty());
    }
}
