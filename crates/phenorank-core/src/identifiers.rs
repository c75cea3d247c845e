//! Identifier grammars and registry-code normalization.

use std::fmt;

use regex::Regex;

use crate::errors::ConfigError;

/// A compiled identifier grammar (e.g. `^HP:\d+$`).
#[derive(Clone)]
pub struct IdGrammar {
    regex: Regex,
}

impl IdGrammar {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// True when the trimmed value matches the grammar.
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value.trim())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Fraction of `values` matching the grammar; 0.0 for an empty slice.
    pub fn match_fraction<'a, I>(&self, values: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (mut hits, mut total) = (0usize, 0usize);
        for v in values {
            total += 1;
            if self.matches(v) {
                hits += 1;
            }
        }
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

impl fmt::Debug for IdGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdGrammar").field(&self.regex.as_str()).finish()
    }
}

/// Normalize a registry code to `PREFIX:<digits>`.
///
/// Accepts `123`, ` 123 `, or an already prefixed `PREFIX:123`.
/// Returns `None` for anything else.
pub fn normalize_registry_code(prefix: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    let digits = match raw.split_once(':') {
        Some((p, rest)) if p.eq_ignore_ascii_case(prefix) => rest.trim(),
        Some(_) => return None,
        None => raw,
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{prefix}:{digits}"))
}

/// The part of an identifier before the first colon, or `""`.
pub fn id_prefix(id: &str) -> &str {
    id.split_once(':').map(|(p, _)| p).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FEATURE_ID_PATTERN, HPO_CONDITION_ID_PATTERN, ORPHA_CONDITION_ID_PATTERN};

    #[test]
    fn feature_grammar() {
        let g = IdGrammar::new(FEATURE_ID_PATTERN).unwrap();
        assert!(g.matches("HP:0001250"));
        assert!(g.matches(" HP:0001250 "));
        assert!(!g.matches("HP:"));
        assert!(!g.matches("ORPHA:558"));
        assert!(!g.matches("hp:0001250"));
    }

    #[test]
    fn condition_grammars() {
        let hpo = IdGrammar::new(HPO_CONDITION_ID_PATTERN).unwrap();
        assert!(hpo.matches("OMIM:154700"));
        assert!(hpo.matches("ORPHA:558"));
        assert!(hpo.matches("DECIPHER:1"));
        assert!(!hpo.matches("154700"));
        let orpha = IdGrammar::new(ORPHA_CONDITION_ID_PATTERN).unwrap();
        assert!(orpha.matches("ORPHA:558"));
        assert!(!orpha.matches("OMIM:154700"));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        assert!(matches!(
            IdGrammar::new("^HP:(\\d+$"),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn match_fraction_counts_hits() {
        let g = IdGrammar::new(FEATURE_ID_PATTERN).unwrap();
        let f = g.match_fraction(["HP:1", "x", "HP:2", ""]);
        assert!((f - 0.5).abs() < 1e-12);
        assert_eq!(g.match_fraction(std::iter::empty()), 0.0);
    }

    #[test]
    fn registry_code_normalization() {
        assert_eq!(normalize_registry_code("ORPHA", "558"), Some("ORPHA:558".into()));
        assert_eq!(normalize_registry_code("ORPHA", "ORPHA:558"), Some("ORPHA:558".into()));
        assert_eq!(normalize_registry_code("ORPHA", "orpha:558"), Some("ORPHA:558".into()));
        assert_eq!(normalize_registry_code("ORPHA", "OMIM:558"), None);
        assert_eq!(normalize_registry_code("ORPHA", "55a8"), None);
        assert_eq!(normalize_registry_code("ORPHA", ""), None);
    }

    #[test]
    fn prefix_of_id() {
        assert_eq!(id_prefix("OMIM:1"), "OMIM");
        assert_eq!(id_prefix("nocolon"), "");
    }
}
