//! Table builder: raw association sources → canonical relations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use phenorank_core::config::{PhenoConfig, SchemaConfig, WeightConfig};
use phenorank_core::errors::{ConfigError, IssueLog, RecordIssue, TableError};
use phenorank_core::models::{Association, Condition, DuplicatePolicy, Feature, SourceProfile, Tables};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::ic::{assign_ic, load_explicit_ic, IcStats};
use crate::labels::LabelSet;
use crate::reader::{read_tsv, HeaderMode, RawTable};
use crate::schema::{ChainedStrategy, SchemaContext, SchemaStrategy};
use crate::weight::WeightCodec;

/// One raw association file and the profile it is normalized under.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationSource {
    pub path: PathBuf,
    pub profile: SourceProfile,
}

impl AssociationSource {
    pub fn new(path: impl Into<PathBuf>, profile: SourceProfile) -> Self {
        Self {
            path: path.into(),
            profile,
        }
    }

    /// Sources named in the config, each with its effective profile.
    pub fn from_config(config: &PhenoConfig, root: &Path) -> Vec<Self> {
        let default_profile = config.schema.effective_profile();
        config
            .paths
            .effective_sources(root)
            .into_iter()
            .map(|s| Self::new(s.path, s.profile.unwrap_or(default_profile)))
            .collect()
    }
}

/// Per-source counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceReport {
    pub source_name: String,
    pub profile: String,
    pub strategy: String,
    pub rows_read: usize,
    pub negated_dropped: usize,
    pub malformed_skipped: usize,
    pub duplicates_collapsed: usize,
    pub associations_added: usize,
}

/// What a build did, beyond the tables themselves.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub sources: Vec<SourceReport>,
    pub labels_loaded: usize,
    pub features_without_label: usize,
    pub ic: IcStats,
    pub ic_invalid_explicit: usize,
    pub issues: IssueLog,
}

impl BuildReport {
    pub fn duplicates_collapsed(&self) -> usize {
        self.sources.iter().map(|s| s.duplicates_collapsed).sum()
    }

    pub fn malformed_skipped(&self) -> usize {
        self.sources.iter().map(|s| s.malformed_skipped).sum()
    }
}

#[derive(Debug)]
pub struct BuildOutput {
    pub tables: Tables,
    pub report: BuildReport,
}

/// Repeated observations of one pair.
#[derive(Debug)]
struct PairAccumulator {
    condition_id: String,
    feature_id: String,
    first: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl PairAccumulator {
    fn collapse(&self, policy: DuplicatePolicy) -> f64 {
        match policy {
            DuplicatePolicy::Max => self.max,
            DuplicatePolicy::Mean => self.sum / self.count as f64,
            DuplicatePolicy::First => self.first,
            DuplicatePolicy::SumClamped => self.sum.min(1.0),
        }
    }
}

/// State shared across all sources of one build.
#[derive(Default)]
struct Accumulator {
    names: BTreeMap<String, String>,
    pair_index: FxHashMap<(String, String), usize>,
    pairs: Vec<PairAccumulator>,
}

pub struct TableBuilder {
    negation_qualifiers: Vec<String>,
    duplicate_policy: DuplicatePolicy,
    hpo: (SchemaContext, WeightCodec),
    orpha: (SchemaContext, WeightCodec),
    strategy: Box<dyn SchemaStrategy + Send + Sync>,
    ontology_labels: Option<PathBuf>,
    label_tables: Vec<PathBuf>,
    feature_ic: Option<PathBuf>,
}

impl TableBuilder {
    /// Builder with no label or IC sources. Fails only on an invalid grammar.
    pub fn new(schema: &SchemaConfig, weights: &WeightConfig) -> Result<Self, ConfigError> {
        let per_profile = |profile| -> Result<(SchemaContext, WeightCodec), ConfigError> {
            Ok((
                SchemaContext::from_config(schema, profile)?,
                WeightCodec::from_config(weights, profile),
            ))
        };
        Ok(Self {
            negation_qualifiers: schema.effective_negation_qualifiers(),
            duplicate_policy: schema.effective_duplicate_policy(),
            hpo: per_profile(SourceProfile::Hpo)?,
            orpha: per_profile(SourceProfile::Orpha)?,
            strategy: Box::new(ChainedStrategy::default()),
            ontology_labels: None,
            label_tables: Vec::new(),
            feature_ic: None,
        })
    }

    /// Builder wired to every label and IC source the config names.
    pub fn from_config(config: &PhenoConfig, root: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(&config.schema, &config.weights)?
            .with_ontology_labels(config.paths.effective_ontology_labels(root))
            .with_label_tables(config.paths.effective_label_tables(root))
            .with_feature_ic(config.paths.effective_feature_ic(root)))
    }

    pub fn with_ontology_labels(mut self, path: PathBuf) -> Self {
        self.ontology_labels = Some(path);
        self
    }

    pub fn with_label_tables(mut self, paths: Vec<PathBuf>) -> Self {
        self.label_tables = paths;
        self
    }

    pub fn with_feature_ic(mut self, path: Option<PathBuf>) -> Self {
        self.feature_ic = path;
        self
    }

    pub fn with_strategy(mut self, strategy: Box<dyn SchemaStrategy + Send + Sync>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Read and normalize every source. Any missing source or undetectable
    /// schema aborts the whole build before anything is returned.
    pub fn build(&self, sources: &[AssociationSource]) -> Result<BuildOutput, TableError> {
        let missing: Vec<&AssociationSource> = sources.iter().filter(|s| !s.path.exists()).collect();
        if let Some(first) = missing.first() {
            return Err(TableError::MissingSource {
                path: first.path.display().to_string(),
            });
        }

        let mut raw = Vec::with_capacity(sources.len());
        for source in sources {
            raw.push((source.profile, read_tsv(&source.path, HeaderMode::Detect)?));
        }
        self.build_from_raw(&raw)
    }

    /// Normalize already-read tables.
    pub fn build_from_raw(&self, raw: &[(SourceProfile, RawTable)]) -> Result<BuildOutput, TableError> {
        let mut acc = Accumulator::default();
        let mut report = BuildReport::default();

        for (profile, table) in raw {
            let source_report = self.ingest(*profile, table, &mut acc, &mut report.issues)?;
            tracing::info!(
                source = %source_report.source_name,
                profile = %source_report.profile,
                strategy = %source_report.strategy,
                rows = source_report.rows_read,
                negated = source_report.negated_dropped,
                malformed = source_report.malformed_skipped,
                duplicates = source_report.duplicates_collapsed,
                associations = source_report.associations_added,
                "normalized association source"
            );
            report.sources.push(source_report);
        }

        let labels = LabelSet::load(self.ontology_labels.as_deref(), &self.label_tables)?;
        report.labels_loaded = labels.len();

        let explicit = match &self.feature_ic {
            Some(path) if path.exists() => {
                let loaded = load_explicit_ic(path)?;
                report.ic_invalid_explicit = loaded.issues.malformed();
                report.issues.merge(loaded.issues);
                loaded.values
            }
            Some(path) => {
                tracing::warn!(path = %path.display(), "explicit IC table absent, estimating all");
                FxHashMap::default()
            }
            None => FxHashMap::default(),
        };

        let associations: Vec<Association> = acc
            .pairs
            .iter()
            .map(|p| {
                Association::new(
                    p.condition_id.clone(),
                    p.feature_id.clone(),
                    p.collapse(self.duplicate_policy),
                )
            })
            .collect();

        let conditions: Vec<Condition> = acc
            .names
            .into_iter()
            .map(|(id, name)| Condition::new(id, name))
            .collect();

        let mut feature_ids: Vec<String> = associations.iter().map(|a| a.feature_id.clone()).collect();
        feature_ids.sort();
        feature_ids.dedup();

        let (ic_values, ic_stats) = assign_ic(&feature_ids, &associations, conditions.len(), &explicit);
        report.ic = ic_stats;

        let features: Vec<Feature> = feature_ids
            .into_iter()
            .zip(ic_values)
            .map(|(id, ic)| {
                let label = labels.get(&id);
                Feature::new(id, label, ic)
            })
            .collect();
        report.features_without_label = features.iter().filter(|f| f.has_fallback_label()).count();

        tracing::info!(
            conditions = conditions.len(),
            features = features.len(),
            associations = associations.len(),
            labels = report.labels_loaded,
            unlabeled = report.features_without_label,
            ic_explicit = report.ic.explicit,
            ic_estimated = report.ic.estimated,
            "built canonical tables"
        );

        Ok(BuildOutput {
            tables: Tables::new(conditions, features, associations),
            report,
        })
    }

    fn context(&self, profile: SourceProfile) -> &(SchemaContext, WeightCodec) {
        match profile {
            SourceProfile::Hpo => &self.hpo,
            SourceProfile::Orpha => &self.orpha,
        }
    }

    fn ingest(
        &self,
        profile: SourceProfile,
        table: &RawTable,
        acc: &mut Accumulator,
        issues: &mut IssueLog,
    ) -> Result<SourceReport, TableError> {
        let (ctx, codec) = self.context(profile);
        let map = self.strategy.detect(table, ctx)?;

        let mut report = SourceReport {
            source_name: table.source_name.clone(),
            profile: profile.to_string(),
            strategy: map.strategy.to_string(),
            rows_read: table.rows.len(),
            ..Default::default()
        };

        for row in &table.rows {
            let qualifier = map.qualifier(row);
            if !qualifier.is_empty()
                && self
                    .negation_qualifiers
                    .iter()
                    .any(|q| q.eq_ignore_ascii_case(qualifier))
            {
                report.negated_dropped += 1;
                continue;
            }

            let condition_id = match map.condition_id(row) {
                Some(id) if ctx.condition_grammar.matches(&id) => id,
                other => {
                    report.malformed_skipped += 1;
                    issues.record(RecordIssue::malformed_line(
                        &table.source_name,
                        row.line,
                        format!(
                            "condition id `{}` does not match {}",
                            other.unwrap_or_default(),
                            ctx.condition_grammar.as_str()
                        ),
                    ));
                    continue;
                }
            };

            let feature_id = map.feature_id(row);
            if !ctx.feature_grammar.matches(feature_id) {
                report.malformed_skipped += 1;
                issues.record(RecordIssue::malformed_line(
                    &table.source_name,
                    row.line,
                    format!(
                        "feature id `{feature_id}` does not match {}",
                        ctx.feature_grammar.as_str()
                    ),
                ));
                continue;
            }

            let weight = codec.decode(map.frequency(row));

            let name = map.name(row);
            let entry = acc.names.entry(condition_id.clone()).or_default();
            if entry.is_empty() && !name.is_empty() {
                *entry = name.to_string();
            }

            let key = (condition_id, feature_id.to_string());
            match acc.pair_index.get(&key) {
                Some(&idx) => {
                    let pair = &mut acc.pairs[idx];
                    pair.max = pair.max.max(weight);
                    pair.sum += weight;
                    pair.count += 1;
                    report.duplicates_collapsed += 1;
                }
                None => {
                    acc.pair_index.insert(key.clone(), acc.pairs.len());
                    acc.pairs.push(PairAccumulator {
                        condition_id: key.0,
                        feature_id: key.1,
                        first: weight,
                        max: weight,
                        sum: weight,
                        count: 1,
                    });
                    report.associations_added += 1;
                }
            }
        }

        if report.associations_added + report.duplicates_collapsed == 0 {
            return Err(TableError::NoAssociations {
                source_name: table.source_name.clone(),
            });
        }
        Ok(report)
    }
}
