// cdeq-core/src/domain/catalog/mod.rs

pub mod cde;
pub mod rule;
pub mod severity;

pub use cde::{Cde, DataType};
pub use rule::{Rule, RuleKind, RuleParams};
pub use severity::Severity;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::error::DomainError;

/// Immutable snapshot of the rule/CDE catalog for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub cdes: Vec<Cde>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Catalog {
    pub fn new(cdes: Vec<Cde>, rules: Vec<Rule>) -> Result<Self, DomainError> {
        let catalog = Self { cdes, rules };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Rule ids key the reconciliation report, so they must be unique.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::with_capacity(self.rules.len());
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err(DomainError::CatalogError(
                    "A rule without an id cannot be reconciled".into(),
                ));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(DomainError::DuplicateRuleId(rule.id.clone()));
            }
        }
        Ok(())
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn cde(&self, name: &str) -> Option<&Cde> {
        self.cdes.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let rules = vec![
            Rule::new("R1", RuleKind::NotNull, "Symbol"),
            Rule::new("R1", RuleKind::Unique, "uitid"),
        ];
        let res = Catalog::new(vec![], rules);
        assert!(matches!(res, Err(DomainError::DuplicateRuleId(id)) if id == "R1"));
    }

    #[test]
    fn test_lookup() -> anyhow::Result<()> {
        let catalog = Catalog::new(
            vec![Cde {
                name: "Symbol".into(),
                description: None,
                data_type: Some(DataType::String),
                systems: vec!["trade".into()],
            }],
            vec![Rule::new("R1", RuleKind::NotNull, "Symbol")],
        )?;
        assert!(catalog.rule("R1").is_some());
        assert!(catalog.rule("R2").is_none());
        assert_eq!(catalog.cde("Symbol").and_then(|c| c.data_type), Some(DataType::String));
        Ok(())
    }
}
