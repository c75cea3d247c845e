//! Non-fatal, record-level issues and their aggregation.
//!
//! A stage that skips a row, an XML element, an edge, or a query term
//! records a [`RecordIssue`] here instead of discarding it. Counts are
//! exact; only the first `sample_limit` issues are kept verbatim.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error_code::{self, PhenoErrorCode};
use crate::constants::DEFAULT_ISSUE_SAMPLE_LIMIT;

/// A problem local to a single record, recovered by skipping that record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordIssue {
    #[error("Malformed record in {source_name} at {location}: {reason}")]
    MalformedRecord {
        source_name: String,
        location: String,
        reason: String,
    },

    #[error("Unresolved edge {condition_id} -> {feature_id}")]
    UnresolvedEdge {
        condition_id: String,
        feature_id: String,
    },

    #[error("Unknown query term {term}")]
    UnknownQueryTerm { term: String },
}

impl RecordIssue {
    /// Shorthand for a malformed record at a 1-based line number.
    pub fn malformed_line(source_name: &str, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            source_name: source_name.to_string(),
            location: format!("line {line}"),
            reason: reason.into(),
        }
    }
}

impl PhenoErrorCode for RecordIssue {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => error_code::MALFORMED_RECORD,
            Self::UnresolvedEdge { .. } => error_code::UNRESOLVED_EDGE,
            Self::UnknownQueryTerm { .. } => error_code::UNKNOWN_QUERY_TERM,
        }
    }
}

/// Exact per-code counts plus a bounded sample of the issues themselves.
#[derive(Debug, Clone)]
pub struct IssueLog {
    counts: BTreeMap<&'static str, usize>,
    samples: Vec<RecordIssue>,
    sample_limit: usize,
}

impl Default for IssueLog {
    fn default() -> Self {
        Self::with_sample_limit(DEFAULT_ISSUE_SAMPLE_LIMIT)
    }
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_limit(sample_limit: usize) -> Self {
        Self {
            counts: BTreeMap::new(),
            samples: Vec::new(),
            sample_limit,
        }
    }

    /// Record one issue.
    pub fn record(&mut self, issue: RecordIssue) {
        *self.counts.entry(issue.error_code()).or_insert(0) += 1;
        if self.samples.len() < self.sample_limit {
            self.samples.push(issue);
        }
    }

    /// Number of issues recorded under `code`.
    pub fn count(&self, code: &str) -> usize {
        self.counts.get(code).copied().unwrap_or(0)
    }

    pub fn malformed(&self) -> usize {
        self.count(error_code::MALFORMED_RECORD)
    }

    pub fn unresolved(&self) -> usize {
        self.count(error_code::UNRESOLVED_EDGE)
    }

    /// Total issues across all codes.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn samples(&self) -> &[RecordIssue] {
        &self.samples
    }

    pub fn counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.counts
    }

    /// Fold another log into this one. Samples keep insertion order.
    pub fn merge(&mut self, other: IssueLog) {
        for (code, n) in other.counts {
            *self.counts.entry(code).or_insert(0) += n;
        }
        let room = self.sample_limit.saturating_sub(self.samples.len());
        self.samples.extend(other.samples.into_iter().take(room));
    }

    /// Serializable view of the counts.
    pub fn summary(&self) -> IssueSummary {
        IssueSummary {
            total: self.total(),
            by_code: self
                .counts
                .iter()
                .map(|(code, n)| (code.to_string(), *n))
                .collect(),
        }
    }
}

/// Flattened issue counts for reports and metadata documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueSummary {
    pub total: usize,
    pub by_code: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_stay_exact_past_sample_limit() {
        let mut log = IssueLog::with_sample_limit(2);
        for i in 0..5 {
            log.record(RecordIssue::malformed_line("phenotype.hpoa", i, "bad id"));
        }
        log.record(RecordIssue::UnresolvedEdge {
            condition_id: "ORPHA:1".into(),
            feature_id: "HP:1".into(),
        });
        assert_eq!(log.malformed(), 5);
        assert_eq!(log.unresolved(), 1);
        assert_eq!(log.total(), 6);
        assert_eq!(log.samples().len(), 2);
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = IssueLog::new();
        a.record(RecordIssue::UnknownQueryTerm { term: "HP:9".into() });
        let mut b = IssueLog::new();
        b.record(RecordIssue::UnknownQueryTerm { term: "HP:8".into() });
        b.record(RecordIssue::malformed_line("x", 1, "y"));
        a.merge(b);
        assert_eq!(a.count(error_code::UNKNOWN_QUERY_TERM), 2);
        assert_eq!(a.malformed(), 1);
        assert_eq!(a.samples().len(), 3);
        assert!(!a.is_clean());
    }
}
