//! `phenorank`: build, enrich, compile and query the phenotype index.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use phenorank_cli::output::{render_build, render_compile, render_enrich, render_results, save_results};
use phenorank_cli::pipeline::{self, QueryRequest};
use phenorank_cli::Workspace;
use phenorank_core::config::CliOverrides;
use phenorank_core::errors::{PhenoErrorCode, PipelineError};
use phenorank_core::models::{InheritanceStrategy, MatrixVariant, SourceProfile};

#[derive(Parser)]
#[command(name = "phenorank", version, about = "Rank rare conditions by observed phenotype features")]
struct Cli {
    /// Config file merged over the project's phenorank.toml
    #[arg(long, global = true, env = "PHENORANK_CONFIG")]
    config: Option<PathBuf>,

    /// Project root; relative paths in the config resolve against it
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Identifier profile for sources that do not name one (hpo, orpha)
    #[arg(long, global = true)]
    profile: Option<SourceProfile>,

    /// Raw source directory
    #[arg(long, global = true)]
    raw_dir: Option<PathBuf>,

    /// Processed artifact directory
    #[arg(long, global = true)]
    processed_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw association sources into the stored relations
    Build {
        /// Weight for associations without a frequency
        #[arg(long)]
        default_weight: Option<f64>,
    },

    /// Fill condition category, prevalence and inheritance from registry documents
    Enrich {
        /// Inheritance extractor (auto, graph, streaming)
        #[arg(long)]
        strategy: Option<InheritanceStrategy>,
    },

    /// Compile the stored relations into sparse matrix artifacts
    Compile,

    /// Rank conditions for a set of phenotype codes
    Query {
        /// Phenotype codes, space or comma separated
        #[arg(long = "hpo", required = true, num_args = 1.., value_delimiter = ',')]
        hpo: Vec<String>,

        /// Number of conditions to return
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        top_k: Option<u64>,

        /// Weight each query code by its information content
        #[arg(long)]
        use_ic: bool,

        /// Matrix variant (weight, weight_norm, weight_ic, weight_ic_norm)
        #[arg(long)]
        variant: Option<MatrixVariant>,

        /// Also write the ranking to a timestamped TSV in the processed directory
        #[arg(long)]
        save: bool,
    },

    /// Build, enrich and compile in one go
    Run {
        #[arg(long)]
        strategy: Option<InheritanceStrategy>,
    },

    /// Null summaries and identifier checks over the stored relations
    Inspect {
        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    phenorank_core::tracing::init_tracing();
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            eprintln!("error: {}", e.coded_string());
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), PipelineError> {
    let mut overrides = CliOverrides {
        config_file: cli.config,
        profile: cli.profile,
        raw_dir: cli.raw_dir,
        processed_dir: cli.processed_dir,
        ..Default::default()
    };
    match &cli.command {
        Commands::Build { default_weight } => overrides.default_weight = *default_weight,
        Commands::Enrich { strategy } | Commands::Run { strategy } => {
            overrides.inheritance_strategy = *strategy;
        }
        Commands::Query { top_k, variant, .. } => {
            overrides.top_k = top_k.map(|k| k as usize);
            overrides.variant = *variant;
        }
        Commands::Compile | Commands::Inspect { .. } => {}
    }
    let ws = Workspace::load(&cli.root, &overrides)?;

    match cli.command {
        Commands::Build { .. } => {
            let summary = pipeline::build(&ws)?;
            print!("{}", render_build(&summary));
        }
        Commands::Enrich { .. } => {
            let summary = pipeline::enrich(&ws)?;
            print!("{}", render_enrich(&summary));
        }
        Commands::Compile => {
            let summary = pipeline::compile(&ws)?;
            print!("{}", render_compile(&summary));
        }
        Commands::Run { .. } => {
            let summary = pipeline::run(&ws)?;
            print!("{}", render_build(&summary.build));
            print!("{}", render_enrich(&summary.enrich));
            print!("{}", render_compile(&summary.compile));
        }
        Commands::Query { hpo, use_ic, save, .. } => {
            let request = QueryRequest {
                codes: hpo,
                use_ic: use_ic.then_some(true),
                ..Default::default()
            };
            let outcome = pipeline::query(&ws, &request)?;
            print!("{}", render_results(&outcome));
            if save {
                let path = save_results(&outcome, &ws.processed_dir(), &chrono::Local::now())?;
                println!("saved {}", path.display());
            }
        }
        Commands::Inspect { json } => {
            let (counts, diagnostics) = pipeline::inspect(&ws)?;
            if json {
                match serde_json::to_string_pretty(&diagnostics) {
                    Ok(text) => println!("{text}"),
                    Err(e) => tracing::warn!(error = %e, "diagnostics not serializable"),
                }
            } else {
                println!(
                    "database {}: {} conditions, {} features, {} associations",
                    ws.database_path().display(),
                    counts.conditions,
                    counts.features,
                    counts.associations
                );
                print!("{}", diagnostics.render());
            }
        }
    }
    Ok(())
}
