// cdeq-core/src/domain/predicate/enumeration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::RuleParams;
use crate::domain::dataset::Value;
use crate::domain::error::EvaluationError;
use crate::domain::predicate::Finding;
use crate::domain::violation::Expectation;

/// Valid value sets per physical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumSets(BTreeMap<String, Vec<String>>);

impl Default for EnumSets {
    fn default() -> Self {
        let mut sets = BTreeMap::new();
        sets.insert("side".to_string(), vec!["BUY".to_string(), "SELL".to_string()]);
        Self(sets)
    }
}

impl EnumSets {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, column: impl Into<String>, values: Vec<String>) {
        self.0.insert(column.into(), values);
    }

    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.0.get(column).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSet {
    pub valid_values: Vec<String>,
}

impl EnumSet {
    /// The rule's own `values` list wins over the configured set for the
    /// column. A column with neither has nothing to check against.
    pub fn resolve(
        params: &RuleParams,
        column: &str,
        configured: &EnumSets,
    ) -> Result<Self, EvaluationError> {
        let valid_values = match params.text_list("values")? {
            Some(values) => values,
            None => configured
                .get(column)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        };
        if valid_values.is_empty() {
            return Err(EvaluationError::NoEnumSet(column.to_string()));
        }
        Ok(Self { valid_values })
    }

    /// Case-sensitive exact membership. Nulls and non-text cells are never
    /// members.
    pub fn contains(&self, value: &Value) -> bool {
        value
            .as_text()
            .is_some_and(|s| self.valid_values.iter().any(|v| v == s))
    }

    /// ENUM_VALUE: every cell outside the set.
    pub fn evaluate<'a>(&self, ids: &'a [String], values: &[&'a Value]) -> Vec<Finding<'a>> {
        ids.iter()
            .zip(values)
            .filter(|(_, v)| !self.contains(v))
            .map(|(id, v)| {
                Finding::new(
                    id,
                    *v,
                    Expectation::EnumValue {
                        valid_values: self.valid_values.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::predicate::tests::{ids, refs};

    #[test]
    fn test_side_has_a_default_set() -> anyhow::Result<()> {
        let set = EnumSet::resolve(&RuleParams::new(), "side", &EnumSets::default())?;
        assert_eq!(set.valid_values, vec!["BUY", "SELL"]);

        let ids = ids(5);
        let cells = [
            Value::from("BUY"),
            Value::from("buy"),
            Value::Null,
            Value::from("SELL"),
            Value::Int(1),
        ];
        let found: Vec<&str> = set
            .evaluate(&ids, &refs(&cells))
            .iter()
            .map(|f| f.record_id)
            .collect();
        assert_eq!(found, vec!["R1", "R2", "R4"]);
        Ok(())
    }

    #[test]
    fn test_column_without_set_is_a_definition_gap() {
        let res = EnumSet::resolve(&RuleParams::new(), "symbol", &EnumSets::default());
        assert_eq!(res, Err(EvaluationError::NoEnumSet("symbol".into())));
    }

    #[test]
    fn test_rule_values_override_configured_set() -> anyhow::Result<()> {
        let params = RuleParams::new().with("values", vec!["B", "S"]);
        let set = EnumSet::resolve(&params, "side", &EnumSets::default())?;
        assert_eq!(set.valid_values, vec!["B", "S"]);
        assert!(set.contains(&Value::from("B")));
        assert!(!set.contains(&Value::from("BUY")));
        Ok(())
    }

    #[test]
    fn test_configured_sets_for_other_columns() -> anyhow::Result<()> {
        let mut sets = EnumSets::empty();
        sets.insert("currency", vec!["USD".into(), "EUR".into()]);
        let set = EnumSet::resolve(&RuleParams::new(), "currency", &sets)?;
        assert!(set.contains(&Value::from("EUR")));
        assert!(EnumSet::resolve(&RuleParams::new(), "side", &sets).is_err());
        Ok(())
    }
}
