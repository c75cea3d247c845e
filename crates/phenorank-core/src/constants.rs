//! Shared constants for the phenorank pipeline.

/// phenorank version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---- Identifier grammars ----

/// Phenotype feature identifiers: two-letter prefix, colon, digits.
pub const FEATURE_ID_PATTERN: &str = r"^HP:\d+$";

/// Condition identifiers in the HPO-only pipeline (OMIM, ORPHA, DECIPHER, ...).
pub const HPO_CONDITION_ID_PATTERN: &str = r"^[A-Z][A-Z0-9]+:\d+$";

/// Condition identifiers in the rare-disease registry pipeline.
pub const ORPHA_CONDITION_ID_PATTERN: &str = r"^ORPHA:\d+$";

/// Registry prefix used to rebuild `ORPHA:<digits>` codes.
pub const ORPHA_PREFIX: &str = "ORPHA";

// ---- Weight codec ----

/// Weight for a missing frequency in the HPO-only pipeline.
pub const DEFAULT_HPO_MISSING_WEIGHT: f64 = 1.0;

/// Weight for a missing frequency in the registry pipeline.
pub const DEFAULT_ORPHA_MISSING_WEIGHT: f64 = 0.5;

/// Weight for a coded band with no known mapping.
pub const DEFAULT_UNKNOWN_BAND_WEIGHT: f64 = 0.5;

/// Weight for any other non-empty frequency token.
pub const DEFAULT_PRESENT_WEIGHT: f64 = 1.0;

/// Prefix identifying ontology-coded frequency bands.
pub const DEFAULT_BAND_PREFIX: &str = "HP:";

/// Coded frequency bands and their midpoint weights.
pub const DEFAULT_FREQUENCY_BANDS: &[(&str, f64)] = &[
    ("HP:0040286", 1.0),   // obligate
    ("HP:0040280", 0.90),  // very frequent
    ("HP:0040281", 0.60),  // frequent
    ("HP:0040282", 0.17),  // occasional
    ("HP:0040283", 0.03),  // rare
    ("HP:0040284", 0.005), // very rare
    ("HP:0040285", 0.0),   // excluded
];

// ---- Schema detection ----

/// Minimum fraction of values matching the feature grammar for a column to qualify.
pub const DEFAULT_FEATURE_MIN_FRACTION: f64 = 0.05;

/// Minimum fraction of values matching the condition grammar for a column to qualify.
pub const DEFAULT_CONDITION_MIN_FRACTION: f64 = 0.02;

/// Qualifier values that negate an annotation.
pub const DEFAULT_NEGATION_QUALIFIERS: &[&str] = &["NOT"];

/// Header aliases that mark a line as the feature-bearing header.
pub const FEATURE_HEADER_ALIASES: &[&str] = &["hpo_id", "hpo-id", "hpoid", "feature_id"];

/// Header aliases for the condition identifier column.
pub const CONDITION_HEADER_ALIASES: &[&str] = &["database_id", "databaseid", "condition_id", "disease_id"];

/// Header aliases for the condition name column.
pub const NAME_HEADER_ALIASES: &[&str] = &["disease_name", "diseasename", "condition_name", "name"];

/// Header aliases for the raw frequency column.
pub const FREQUENCY_HEADER_ALIASES: &[&str] = &["frequency", "freq", "weight"];

/// Header aliases for the qualifier column.
pub const QUALIFIER_HEADER_ALIASES: &[&str] = &["qualifier"];

// ---- Enrichment ----

/// Classification documents, scanned in sorted order.
pub const DEFAULT_CLASSIFICATION_GLOB: &str = "en_product3_*.xml";

/// Secondary classification document, used only when the primary ones yield nothing.
pub const DEFAULT_CLASSIFICATION_FALLBACK: &str = "en_product6.xml";

/// Prevalence documents, scanned in order.
pub const DEFAULT_PREVALENCE_FILES: &[&str] = &["en_product4.xml", "en_product9_prev.xml"];

/// Ontology document carrying inheritance-mode restrictions.
pub const DEFAULT_ONTOLOGY_FILE: &str = "ordo.owl";

/// Largest ontology document the graph extractor will materialize (256 MiB).
pub const DEFAULT_GRAPH_MAX_BYTES: u64 = 268_435_456;

// ---- Paths ----

/// Raw source directory, relative to the project root.
pub const DEFAULT_RAW_DIR: &str = "data_raw";

/// Processed artifact directory, relative to the project root.
pub const DEFAULT_PROCESSED_DIR: &str = "data_proc";

/// SQLite database file name inside the processed directory.
pub const DEFAULT_DATABASE_FILE: &str = "phenorank.db";

/// Association source, relative to the raw directory.
pub const DEFAULT_ASSOCIATION_FILE: &str = "hpo/phenotype.hpoa";

/// Ontology label document, relative to the raw directory.
pub const DEFAULT_ONTOLOGY_LABELS: &str = "hpo/hp.json";

/// Optional label tables, relative to the raw directory.
pub const DEFAULT_LABEL_TABLES: &[&str] = &["hpo/genes_to_phenotype.txt", "hpo/phenotype_to_genes.txt"];

/// Registry document directory, relative to the raw directory.
pub const DEFAULT_ORPHA_DIR: &str = "orpha";

/// Mapping/metadata document name.
pub const MAPPINGS_FILE: &str = "mappings.json";

// ---- Retrieval ----

/// Default number of ranked conditions returned.
pub const DEFAULT_TOP_K: usize = 10;

/// Rows written to preview exports.
pub const PREVIEW_ROWS: usize = 200;

/// Issues retained verbatim per log; counts are always exact.
pub const DEFAULT_ISSUE_SAMPLE_LIMIT: usize = 50;
