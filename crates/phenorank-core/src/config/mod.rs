//! Configuration system for phenorank.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod enrich_config;
pub mod paths_config;
pub mod pheno_config;
pub mod retrieval_config;
pub mod schema_config;
pub mod weight_config;

pub use enrich_config::EnrichConfig;
pub use paths_config::{PathsConfig, SourceConfig};
pub use pheno_config::{CliOverrides, PhenoConfig};
pub use retrieval_config::RetrievalConfig;
pub use schema_config::SchemaConfig;
pub use weight_config::WeightConfig;
