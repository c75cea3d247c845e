//! V001: the three canonical relations.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS condition (
    condition_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT,
    prevalence_band TEXT,
    inheritance TEXT
) STRICT;

-- ic is NULL when no finite value is known.
CREATE TABLE IF NOT EXISTS feature (
    feature_id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    ic REAL
) STRICT;

-- ordinal keeps first-occurrence order of the pair.
CREATE TABLE IF NOT EXISTS condition_feature (
    ordinal INTEGER PRIMARY KEY,
    condition_id TEXT NOT NULL,
    feature_id TEXT NOT NULL,
    weight REAL NOT NULL,
    UNIQUE(condition_id, feature_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_condition_feature_feature
    ON condition_feature(feature_id);
"#;
