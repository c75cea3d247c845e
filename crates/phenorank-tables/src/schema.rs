//! Schema detection: locate the logical columns of a raw association table.
//!
//! Two strategies exist. [`HeaderStrategy`] renames known header aliases.
//! [`SniffingStrategy`] scores every column by the fraction of its values
//! matching an identifier grammar and keeps the best one. [`ChainedStrategy`]
//! tries them in order.

use std::sync::LazyLock;

use phenorank_core::config::SchemaConfig;
use phenorank_core::constants::{
    CONDITION_HEADER_ALIASES, FEATURE_HEADER_ALIASES, FREQUENCY_HEADER_ALIASES,
    NAME_HEADER_ALIASES, QUALIFIER_HEADER_ALIASES,
};
use phenorank_core::errors::{ColumnRole, ConfigError, TableError};
use phenorank_core::identifiers::{normalize_registry_code, IdGrammar};
use phenorank_core::models::SourceProfile;

use regex::Regex;

use crate::reader::{RawRow, RawTable};

/// Ratio or percentage tokens, as understood by the weight codec.
static FREQUENCY_TOKEN_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?\s*(?:/\s*\d+(?:\.\d+)?|%)$").ok());

/// Where the condition identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionColumn {
    /// A single column holding full identifiers.
    Direct(usize),
    /// Registry dumps: a prefix column (`ORPHA`) plus a digits column.
    Composite {
        prefix_column: usize,
        digits_column: usize,
        prefix: String,
    },
}

/// Resolved positions of the logical columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub condition: ConditionColumn,
    pub feature: usize,
    pub name: Option<usize>,
    pub frequency: Option<usize>,
    pub qualifier: Option<usize>,
    /// Strategy that produced this map.
    pub strategy: &'static str,
}

impl ColumnMap {
    /// Raw condition identifier for `row`, trimmed. `None` when a composite
    /// row does not carry the registry prefix or a digits-only code.
    pub fn condition_id(&self, row: &RawRow) -> Option<String> {
        match &self.condition {
            ConditionColumn::Direct(idx) => {
                let v = row.cell(*idx).trim();
                (!v.is_empty()).then(|| v.to_string())
            }
            ConditionColumn::Composite {
                prefix_column,
                digits_column,
                prefix,
            } => {
                if !row.cell(*prefix_column).trim().eq_ignore_ascii_case(prefix) {
                    return None;
                }
                normalize_registry_code(prefix, row.cell(*digits_column))
            }
        }
    }

    pub fn feature_id<'a>(&self, row: &'a RawRow) -> &'a str {
        row.cell(self.feature).trim()
    }

    pub fn name<'a>(&self, row: &'a RawRow) -> &'a str {
        self.name.map(|i| row.cell(i).trim()).unwrap_or("")
    }

    pub fn frequency<'a>(&self, row: &'a RawRow) -> Option<&'a str> {
        self.frequency.map(|i| row.cell(i))
    }

    pub fn qualifier<'a>(&self, row: &'a RawRow) -> &'a str {
        self.qualifier.map(|i| row.cell(i).trim()).unwrap_or("")
    }
}

/// Grammars and thresholds shared by all strategies for one source.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    pub feature_grammar: IdGrammar,
    pub condition_grammar: IdGrammar,
    pub feature_min_fraction: f64,
    pub condition_min_fraction: f64,
    pub registry_prefix: Option<String>,
}

impl SchemaContext {
    pub fn from_config(config: &SchemaConfig, profile: SourceProfile) -> Result<Self, ConfigError> {
        Ok(Self {
            feature_grammar: IdGrammar::new(config.effective_feature_pattern())?,
            condition_grammar: IdGrammar::new(config.effective_condition_pattern(profile))?,
            feature_min_fraction: config.effective_feature_min_fraction(),
            condition_min_fraction: config.effective_condition_min_fraction(),
            registry_prefix: profile.registry_prefix().map(str::to_string),
        })
    }
}

/// A deterministic column-detection strategy.
pub trait SchemaStrategy {
    fn name(&self) -> &'static str;

    fn detect(&self, table: &RawTable, ctx: &SchemaContext) -> Result<ColumnMap, TableError>;
}

/// Direct rename from known header aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderStrategy;

impl SchemaStrategy for HeaderStrategy {
    fn name(&self) -> &'static str {
        "header"
    }

    fn detect(&self, table: &RawTable, ctx: &SchemaContext) -> Result<ColumnMap, TableError> {
        let feature = table
            .find_column(FEATURE_HEADER_ALIASES)
            .ok_or_else(|| failure(table, ColumnRole::Feature, 0.0, ctx.feature_min_fraction))?;
        let condition = table
            .find_column(CONDITION_HEADER_ALIASES)
            .ok_or_else(|| {
                failure(table, ColumnRole::Condition, 0.0, ctx.condition_min_fraction)
            })?;
        Ok(ColumnMap {
            condition: ConditionColumn::Direct(condition),
            feature,
            name: table.find_column(NAME_HEADER_ALIASES),
            frequency: table.find_column(FREQUENCY_HEADER_ALIASES),
            qualifier: table.find_column(QUALIFIER_HEADER_ALIASES),
            strategy: self.name(),
        })
    }
}

/// Column-content sniffing against the identifier grammars.
#[derive(Debug, Clone, Copy, Default)]
pub struct SniffingStrategy;

impl SchemaStrategy for SniffingStrategy {
    fn name(&self) -> &'static str {
        "sniffing"
    }

    fn detect(&self, table: &RawTable, ctx: &SchemaContext) -> Result<ColumnMap, TableError> {
        let (feature, feature_frac) =
            best_column(table, None, |v| ctx.feature_grammar.matches(v));
        let feature = match feature {
            Some(idx) if feature_frac >= ctx.feature_min_fraction => idx,
            _ => {
                return Err(failure(
                    table,
                    ColumnRole::Feature,
                    feature_frac,
                    ctx.feature_min_fraction,
                ))
            }
        };

        // Feature codes can satisfy a broad condition grammar; never count them.
        let (direct, direct_frac) = best_column(table, Some(feature), |v| {
            ctx.condition_grammar.matches(v) && !ctx.feature_grammar.matches(v)
        });
        let condition = match direct {
            Some(idx) if direct_frac >= ctx.condition_min_fraction => ConditionColumn::Direct(idx),
            _ => match composite_condition(table, feature, ctx) {
                Some(c) => c,
                None => {
                    return Err(failure(
                        table,
                        ColumnRole::Condition,
                        direct_frac,
                        ctx.condition_min_fraction,
                    ))
                }
            },
        };

        tracing::debug!(
            source = %table.source_name,
            feature_column = feature,
            feature_fraction = feature_frac,
            condition = ?condition,
            "sniffed identifier columns"
        );

        let mut taken = vec![feature];
        match &condition {
            ConditionColumn::Direct(idx) => taken.push(*idx),
            ConditionColumn::Composite {
                prefix_column,
                digits_column,
                ..
            } => taken.extend([*prefix_column, *digits_column]),
        }
        let frequency = table
            .find_column(FREQUENCY_HEADER_ALIASES)
            .or_else(|| sniff_frequency_column(table, &taken, ctx));

        Ok(ColumnMap {
            condition,
            feature,
            name: sniff_name_column(table),
            frequency,
            qualifier: table.find_column(QUALIFIER_HEADER_ALIASES),
            strategy: self.name(),
        })
    }
}

/// Try each strategy in order; the last failure is returned.
pub struct ChainedStrategy {
    strategies: Vec<Box<dyn SchemaStrategy + Send + Sync>>,
}

impl ChainedStrategy {
    pub fn new(strategies: Vec<Box<dyn SchemaStrategy + Send + Sync>>) -> Self {
        Self { strategies }
    }
}

impl Default for ChainedStrategy {
    /// Header first, then sniffing.
    fn default() -> Self {
        Self::new(vec![Box::new(HeaderStrategy), Box::new(SniffingStrategy)])
    }
}

impl SchemaStrategy for ChainedStrategy {
    fn name(&self) -> &'static str {
        "chained"
    }

    fn detect(&self, table: &RawTable, ctx: &SchemaContext) -> Result<ColumnMap, TableError> {
        let mut last_err = None;
        for strategy in &self.strategies {
            match strategy.detect(table, ctx) {
                Ok(map) => return Ok(map),
                Err(e) => {
                    tracing::debug!(
                        source = %table.source_name,
                        strategy = strategy.name(),
                        error = %e,
                        "schema strategy did not apply"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            failure(table, ColumnRole::Feature, 0.0, ctx.feature_min_fraction)
        }))
    }
}

/// Highest-scoring column other than `skip`; ties go to the leftmost column.
fn best_column<F>(table: &RawTable, skip: Option<usize>, pred: F) -> (Option<usize>, f64)
where
    F: Fn(&str) -> bool,
{
    let mut best: (Option<usize>, f64) = (None, 0.0);
    if table.rows.is_empty() {
        return best;
    }
    let n = table.rows.len() as f64;
    for idx in (0..table.width()).filter(|i| Some(*i) != skip) {
        let hits = table.column(idx).filter(|v| pred(v)).count();
        let frac = hits as f64 / n;
        if best.0.is_none() || frac > best.1 {
            best = (Some(idx), frac);
        }
    }
    best
}

fn composite_condition(
    table: &RawTable,
    feature: usize,
    ctx: &SchemaContext,
) -> Option<ConditionColumn> {
    let prefix = ctx.registry_prefix.as_deref()?;
    let (prefix_col, prefix_frac) =
        best_column(table, Some(feature), |v| v.trim().eq_ignore_ascii_case(prefix));
    let prefix_col = prefix_col.filter(|_| prefix_frac >= ctx.condition_min_fraction)?;

    let (digits_col, digits_frac) = best_column(table, Some(prefix_col), |v| is_digits(v.trim()));
    let digits_col = digits_col.filter(|_| digits_frac >= ctx.condition_min_fraction)?;

    Some(ConditionColumn::Composite {
        prefix_column: prefix_col,
        digits_column: digits_col,
        prefix: prefix.to_string(),
    })
}

fn is_digits(v: &str) -> bool {
    !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit())
}

/// Best column of frequency-like tokens (ratios, percentages, coded bands)
/// among the columns not already assigned.
fn sniff_frequency_column(table: &RawTable, taken: &[usize], ctx: &SchemaContext) -> Option<usize> {
    let looks_like_frequency = |v: &str| {
        let v = v.trim();
        ctx.feature_grammar.matches(v)
            || FREQUENCY_TOKEN_RE
                .as_ref()
                .is_some_and(|re| re.is_match(v))
    };
    let mut best: (Option<usize>, f64) = (None, 0.0);
    let n = table.rows.len().max(1) as f64;
    for idx in (0..table.width()).filter(|i| !taken.contains(i)) {
        let frac = table.column(idx).filter(|v| looks_like_frequency(v)).count() as f64 / n;
        if frac > best.1 {
            best = (Some(idx), frac);
        }
    }
    best.0.filter(|_| best.1 >= ctx.feature_min_fraction)
}

/// `disease` + `name` header first, else any header containing `name`.
fn sniff_name_column(table: &RawTable) -> Option<usize> {
    if !table.has_header {
        return None;
    }
    let lower: Vec<String> = table.columns.iter().map(|c| c.to_ascii_lowercase()).collect();
    lower
        .iter()
        .position(|c| c.contains("disease") && c.contains("name"))
        .or_else(|| lower.iter().position(|c| c.contains("name")))
}

fn failure(table: &RawTable, role: ColumnRole, best_fraction: f64, threshold: f64) -> TableError {
    TableError::SchemaDetectionFailure {
        source_name: table.source_name.clone(),
        role,
        best_fraction,
        threshold,
    }
}
