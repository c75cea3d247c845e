//! Condition (disease/disorder) records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A disease or disorder entity keyed by a stable registry code.
///
/// `category`, `prevalence_band` and `inheritance` start empty and are
/// filled at most once by the enricher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub condition_id: String,
    pub name: String,
    pub category: Option<String>,
    pub prevalence_band: Option<String>,
    pub inheritance: Option<String>,
}

impl Condition {
    pub fn new(condition_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            condition_id: condition_id.into(),
            name: name.into(),
            category: None,
            prevalence_band: None,
            inheritance: None,
        }
    }

    pub fn attribute(&self, attribute: ConditionAttribute) -> Option<&str> {
        match attribute {
            ConditionAttribute::Category => self.category.as_deref(),
            ConditionAttribute::PrevalenceBand => self.prevalence_band.as_deref(),
            ConditionAttribute::Inheritance => self.inheritance.as_deref(),
        }
    }

    fn slot_mut(&mut self, attribute: ConditionAttribute) -> &mut Option<String> {
        match attribute {
            ConditionAttribute::Category => &mut self.category,
            ConditionAttribute::PrevalenceBand => &mut self.prevalence_band,
            ConditionAttribute::Inheritance => &mut self.inheritance,
        }
    }

    /// Set `attribute` only if it is currently empty. Returns true if written.
    pub fn fill_if_empty(&mut self, attribute: ConditionAttribute, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let slot = self.slot_mut(attribute);
        if slot.as_deref().is_some_and(|v| !v.trim().is_empty()) {
            return false;
        }
        *slot = Some(value.to_string());
        true
    }
}

/// Enrichable condition attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionAttribute {
    Category,
    PrevalenceBand,
    Inheritance,
}

impl ConditionAttribute {
    pub const ALL: [ConditionAttribute; 3] = [
        ConditionAttribute::Category,
        ConditionAttribute::PrevalenceBand,
        ConditionAttribute::Inheritance,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::PrevalenceBand => "prevalence_band",
            Self::Inheritance => "inheritance",
        }
    }
}

impl fmt::Display for ConditionAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_if_empty_never_overwrites() {
        let mut c = Condition::new("ORPHA:558", "Marfan syndrome");
        assert!(c.fill_if_empty(ConditionAttribute::Category, "Rare genetic disease"));
        assert!(!c.fill_if_empty(ConditionAttribute::Category, "Rare cardiac disease"));
        assert_eq!(c.category.as_deref(), Some("Rare genetic disease"));
    }

    #[test]
    fn fill_if_empty_ignores_blank_values() {
        let mut c = Condition::new("ORPHA:558", "");
        assert!(!c.fill_if_empty(ConditionAttribute::Inheritance, "   "));
        assert!(c.inheritance.is_none());
    }

    #[test]
    fn blank_existing_value_counts_as_empty() {
        let mut c = Condition::new("ORPHA:558", "");
        c.prevalence_band = Some(String::new());
        assert!(c.fill_if_empty(ConditionAttribute::PrevalenceBand, "1-5 / 10 000"));
        assert_eq!(c.attribute(ConditionAttribute::PrevalenceBand), Some("1-5 / 10 000"));
    }
}
