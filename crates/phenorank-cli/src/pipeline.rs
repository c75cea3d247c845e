//! The pipeline stages: build → enrich → compile, then query or inspect.

use std::path::PathBuf;

use phenorank_core::constants::PREVIEW_ROWS;
use phenorank_core::errors::PipelineError;
use phenorank_core::identifiers::IdGrammar;
use phenorank_core::models::{MatrixVariant, Tables};
use phenorank_enrich::{ConditionEnricher, EnrichReport};
use phenorank_matrix::{CompileReport, CompiledArtifacts, IndexCompiler};
use phenorank_retrieval::{RetrievalEngine, RetrievalOutcome};
use phenorank_storage::queries::tables::RelationCounts;
use phenorank_storage::{export_tables, write_previews, ExportedFiles};
use phenorank_tables::diagnostics::{diagnose, Diagnostics};
use phenorank_tables::{AssociationSource, BuildReport, TableBuilder};

use crate::workspace::Workspace;

#[derive(Debug)]
pub struct BuildSummary {
    pub report: BuildReport,
    pub counts: RelationCounts,
    pub exported: ExportedFiles,
}

#[derive(Debug)]
pub struct EnrichSummary {
    pub report: EnrichReport,
    pub rows_updated: usize,
    pub exported: ExportedFiles,
}

#[derive(Debug)]
pub struct CompileSummary {
    pub report: CompileReport,
    pub written: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub build: BuildSummary,
    pub enrich: EnrichSummary,
    pub compile: CompileSummary,
}

/// One retrieval request. Unset fields fall back to the `retrieval` config.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub codes: Vec<String>,
    pub top_k: Option<usize>,
    pub use_ic: Option<bool>,
    pub variant: Option<MatrixVariant>,
}

/// Read every raw source, normalize, and replace the stored relations.
/// Nothing is written unless the whole build succeeds.
pub fn build(ws: &Workspace) -> Result<BuildSummary, PipelineError> {
    let config = ws.config();
    let builder = TableBuilder::from_config(config, ws.root())?;
    let sources = AssociationSource::from_config(config, ws.root());
    tracing::info!(sources = sources.len(), "building tables");

    let output = builder.build(&sources)?;
    let db = ws.open_database()?;
    db.replace_tables(&output.tables)?;
    let exported = export(ws, &output.tables)?;

    Ok(BuildSummary {
        counts: db.counts()?,
        report: output.report,
        exported,
    })
}

/// Fill empty condition attributes from the registry documents.
pub fn enrich(ws: &Workspace) -> Result<EnrichSummary, PipelineError> {
    let db = ws.open_database()?;
    let mut tables = db.load_tables()?;
    if tables.conditions.is_empty() {
        tracing::warn!("no conditions stored; run build first");
    }

    let enricher = ConditionEnricher::from_config(ws.config(), ws.root());
    let report = enricher.enrich(&mut tables.conditions);
    let rows_updated = db.update_enrichment(&tables.conditions)?;
    let exported = export(ws, &tables)?;

    Ok(EnrichSummary {
        report,
        rows_updated,
        exported,
    })
}

/// Compile the stored relations into matrix artifacts in the processed directory.
pub fn compile(ws: &Workspace) -> Result<CompileSummary, PipelineError> {
    let tables = ws.open_database()?.load_tables()?;
    let output = IndexCompiler::new().compile(&tables);
    let written = output.artifacts.save(&ws.processed_dir())?;
    Ok(CompileSummary {
        report: output.report,
        written,
    })
}

pub fn run(ws: &Workspace) -> Result<RunSummary, PipelineError> {
    let build = build(ws)?;
    let enrich = enrich(ws)?;
    let compile = compile(ws)?;
    Ok(RunSummary {
        build,
        enrich,
        compile,
    })
}

/// Rank conditions for `request.codes` against the compiled artifacts.
pub fn query(ws: &Workspace, request: &QueryRequest) -> Result<RetrievalOutcome, PipelineError> {
    let retrieval = &ws.config().retrieval;
    let variant = request.variant.unwrap_or_else(|| retrieval.effective_variant());
    let top_k = request.top_k.unwrap_or_else(|| retrieval.effective_top_k());
    let use_ic = request.use_ic.unwrap_or_else(|| retrieval.effective_use_ic());

    let tables = ws.open_database()?.load_tables()?;
    let artifacts = CompiledArtifacts::load_variant(&ws.processed_dir(), variant)?;
    let engine = RetrievalEngine::new(&artifacts, variant, &tables)?;
    let outcome = engine.retrieve(&request.codes, top_k, use_ic)?;
    tracing::info!(
        variant = %variant,
        top_k,
        use_ic,
        results = outcome.results.len(),
        unknown = outcome.unknown_terms.len(),
        "query answered"
    );
    Ok(outcome)
}

/// Null summaries and identifier checks over the stored relations.
pub fn inspect(ws: &Workspace) -> Result<(RelationCounts, Diagnostics), PipelineError> {
    let schema = &ws.config().schema;
    let feature_grammar = IdGrammar::new(schema.effective_feature_pattern())?;
    let condition_grammar =
        IdGrammar::new(schema.effective_condition_pattern(schema.effective_profile()))?;

    let db = ws.open_database()?;
    let tables = db.load_tables()?;
    Ok((
        db.counts()?,
        diagnose(&tables, &feature_grammar, &condition_grammar),
    ))
}

fn export(ws: &Workspace, tables: &Tables) -> Result<ExportedFiles, PipelineError> {
    let exported = export_tables(tables, &ws.processed_dir())?;
    write_previews(tables, &ws.previews_dir(), PREVIEW_ROWS)?;
    Ok(exported)
}
