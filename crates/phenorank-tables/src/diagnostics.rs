//! Null summaries and identifier checks over the canonical relations.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use phenorank_core::identifiers::{id_prefix, IdGrammar};
use phenorank_core::models::Tables;
use rustc_hash::FxHashSet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: &'static str,
    /// Missing or blank cells.
    pub nulls: usize,
    pub distinct: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub table: &'static str,
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub tables: Vec<TableSummary>,
    pub condition_prefixes: BTreeMap<String, usize>,
    pub feature_prefixes: BTreeMap<String, usize>,
    pub bad_condition_ids: Vec<String>,
    pub bad_feature_ids: Vec<String>,
    pub features_with_fallback_label: usize,
}

fn summarize<'a, I>(column: &'static str, values: I) -> ColumnSummary
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut nulls = 0;
    let mut distinct: FxHashSet<&str> = FxHashSet::default();
    for v in values {
        match v.map(str::trim) {
            Some(s) if !s.is_empty() => {
                distinct.insert(s);
            }
            _ => nulls += 1,
        }
    }
    ColumnSummary {
        column,
        nulls,
        distinct: distinct.len(),
    }
}

fn float_summary<I: Iterator<Item = f64>>(column: &'static str, values: I) -> ColumnSummary {
    let mut nulls = 0;
    let mut distinct: FxHashSet<u64> = FxHashSet::default();
    for v in values {
        if v.is_finite() {
            distinct.insert(v.to_bits());
        } else {
            nulls += 1;
        }
    }
    ColumnSummary {
        column,
        nulls,
        distinct: distinct.len(),
    }
}

/// Summarize `tables`, checking ids against the given grammars.
pub fn diagnose(tables: &Tables, feature_grammar: &IdGrammar, condition_grammar: &IdGrammar) -> Diagnostics {
    let c = &tables.conditions;
    let f = &tables.features;
    let a = &tables.associations;

    let condition = TableSummary {
        table: "condition",
        rows: c.len(),
        columns: vec![
            summarize("condition_id", c.iter().map(|x| Some(x.condition_id.as_str()))),
            summarize("name", c.iter().map(|x| Some(x.name.as_str()))),
            summarize("category", c.iter().map(|x| x.category.as_deref())),
            summarize("prevalence_band", c.iter().map(|x| x.prevalence_band.as_deref())),
            summarize("inheritance", c.iter().map(|x| x.inheritance.as_deref())),
        ],
    };
    let feature = TableSummary {
        table: "feature",
        rows: f.len(),
        columns: vec![
            summarize("feature_id", f.iter().map(|x| Some(x.feature_id.as_str()))),
            summarize("label", f.iter().map(|x| Some(x.label.as_str()))),
            float_summary("ic", f.iter().map(|x| x.ic)),
        ],
    };
    let association = TableSummary {
        table: "condition_feature",
        rows: a.len(),
        columns: vec![
            summarize("condition_id", a.iter().map(|x| Some(x.condition_id.as_str()))),
            summarize("feature_id", a.iter().map(|x| Some(x.feature_id.as_str()))),
            float_summary("weight", a.iter().map(|x| x.weight)),
        ],
    };

    let mut condition_prefixes = BTreeMap::new();
    for x in c {
        *condition_prefixes.entry(id_prefix(&x.condition_id).to_string()).or_insert(0) += 1;
    }
    let mut feature_prefixes = BTreeMap::new();
    for x in f {
        *feature_prefixes.entry(id_prefix(&x.feature_id).to_string()).or_insert(0) += 1;
    }

    Diagnostics {
        tables: vec![condition, feature, association],
        condition_prefixes,
        feature_prefixes,
        bad_condition_ids: c
            .iter()
            .filter(|x| !condition_grammar.matches(&x.condition_id))
            .map(|x| x.condition_id.clone())
            .collect(),
        bad_feature_ids: f
            .iter()
            .filter(|x| !feature_grammar.matches(&x.feature_id))
            .map(|x| x.feature_id.clone())
            .collect(),
        features_with_fallback_label: f.iter().filter(|x| x.has_fallback_label()).count(),
    }
}

impl Diagnostics {
    /// Plain-text report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== NULLS SUMMARY ===");
        let _ = writeln!(out, "{:<20}{:<18}{:>10}{:>10}{:>10}", "table", "column", "nulls", "pct", "distinct");
        for t in &self.tables {
            for col in &t.columns {
                let pct = if t.rows == 0 {
                    0.0
                } else {
                    100.0 * col.nulls as f64 / t.rows as f64
                };
                let _ = writeln!(
                    out,
                    "{:<20}{:<18}{:>10}{:>9.1}%{:>10}",
                    t.table, col.column, col.nulls, pct, col.distinct
                );
            }
        }

        let _ = writeln!(out, "\n=== ID PREFIXES ===");
        for (prefix, n) in &self.condition_prefixes {
            let _ = writeln!(out, "condition {prefix:<12}{n:>10}");
        }
        for (prefix, n) in &self.feature_prefixes {
            let _ = writeln!(out, "feature   {prefix:<12}{n:>10}");
        }

        if self.bad_condition_ids.is_empty() && self.bad_feature_ids.is_empty() {
            let _ = writeln!(out, "\nNo ID format issues found.");
        } else {
            let _ = writeln!(out, "\n=== ID FORMAT ISSUES ===");
            for id in self.bad_condition_ids.iter().take(20) {
                let _ = writeln!(out, "condition {id}");
            }
            for id in self.bad_feature_ids.iter().take(20) {
                let _ = writeln!(out, "feature   {id}");
            }
        }
        let _ = writeln!(
            out,
            "\nFeatures labelled by id only: {}",
            self.features_with_fallback_label
        );
        out
    }
}
