// cdeq-core/src/application/dispatcher.rs

use tracing::{debug, error, instrument, warn};

use crate::domain::catalog::Rule;
use crate::domain::dataset::{DEFAULT_ID_FIELD, Dataset};
use crate::domain::error::{DomainError, EvaluationError};
use crate::domain::predicate::{EnumSets, Predicate};
use crate::domain::resolver::ColumnMapping;
use crate::domain::system::SystemRegistry;
use crate::domain::violation::{Violation, ViolationDetail};

/// Routes one rule against one system's dataset.
///
/// Every data or definition problem is downgraded to a log line and zero
/// violations. The only error returned is a violation stamped with a
/// system outside the registry.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    pub mapping: ColumnMapping,
    pub systems: SystemRegistry,
    pub id_field: String,
    pub enum_sets: EnumSets,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            mapping: ColumnMapping::default(),
            systems: SystemRegistry::default(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            enum_sets: EnumSets::default(),
        }
    }
}

impl RuleEngine {
    pub fn new(
        mapping: ColumnMapping,
        systems: SystemRegistry,
        id_field: impl Into<String>,
        enum_sets: EnumSets,
    ) -> Self {
        Self {
            mapping,
            systems,
            id_field: id_field.into(),
            enum_sets,
        }
    }

    #[instrument(skip(self, rule, dataset), fields(rule_id = %rule.id))]
    pub fn evaluate(
        &self,
        rule: &Rule,
        system: &str,
        dataset: &Dataset,
    ) -> Result<Vec<Violation>, DomainError> {
        let Some(kind) = rule.kind.as_ref() else {
            warn!(rule_id = %rule.id, "Rule has no kind, skipping");
            return Ok(Vec::new());
        };

        let Some(column) = self.mapping.resolve(rule.cde_name.as_deref(), system) else {
            warn!(rule_id = %rule.id, system, cde = ?rule.cde_name, "Could not resolve column for CDE");
            return Ok(Vec::new());
        };
        let Some(values) = dataset.column(&column) else {
            warn!(rule_id = %rule.id, system, column = %column, "Column not found in dataset");
            return Ok(Vec::new());
        };
        let Some(ids) = dataset.identifiers(&self.id_field) else {
            warn!(rule_id = %rule.id, system, id_field = %self.id_field, "Identifier field not found in dataset");
            return Ok(Vec::new());
        };

        let findings = match Predicate::build(kind, &rule.definition, &column, &self.enum_sets)
            .and_then(|predicate| predicate.evaluate(&ids, &values))
        {
            Ok(findings) => findings,
            Err(err) => {
                log_skipped(rule, system, &column, &err);
                return Ok(Vec::new());
            }
        };

        if findings.is_empty() {
            debug!(rule_id = %rule.id, system, "No violations");
            return Ok(Vec::new());
        }
        self.systems.ensure_known(system)?;

        let cde_name = rule.cde_name.clone().unwrap_or_default();
        let rule_name = rule.display_name();
        let violations: Vec<Violation> = findings
            .into_iter()
            .map(|finding| {
                let detail = ViolationDetail {
                    column: column.clone(),
                    value: finding.value.clone(),
                    expectation: finding.expectation,
                    severity: rule.severity.clone(),
                    rule_name: Some(rule_name.clone()),
                };
                Violation::open(&rule.id, &cde_name, system, finding.record_id, detail)
            })
            .collect();

        debug!(rule_id = %rule.id, system, count = violations.len(), "Rule evaluated");
        Ok(violations)
    }
}

fn log_skipped(rule: &Rule, system: &str, column: &str, err: &EvaluationError) {
    if err.is_definition_gap() {
        warn!(rule_id = %rule.id, system, column, error = %err, "Rule skipped");
    } else {
        error!(rule_id = %rule.id, system, column, error = %err, "Rule evaluation failed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::catalog::{RuleKind, RuleParams, Severity};
    use crate::domain::dataset::{Value, record};
    use crate::domain::violation::ViolationStatus;

    fn trades() -> Dataset {
        Dataset::from_records(vec![
            record([("uitid", Value::from("T001")), ("quantity", Value::Int(100)), ("symbol", Value::from("AAPL"))]),
            record([("uitid", Value::from("T002")), ("quantity", Value::Null), ("symbol", Value::from("msft"))]),
            record([("uitid", Value::from("T003")), ("quantity", Value::Int(-50)), ("symbol", Value::from("IBM"))]),
        ])
    }

    #[test]
    fn test_range_violation_carries_context() -> anyhow::Result<()> {
        let engine = RuleEngine::default();
        let rule = Rule::new("R1", RuleKind::Range, "Quantity")
            .with_definition(RuleParams::new().with("min", 0))
            .with_severity(Severity::Error);

        let violations = engine.evaluate(&rule, "trade", &trades())?;
        let ids: Vec<&str> = violations.iter().map(|v| v.uitid.as_str()).collect();
        assert_eq!(ids, vec!["T002", "T003"]);

        let v = &violations[1];
        assert_eq!(v.rule_id, "R1");
        assert_eq!(v.cde_name, "Quantity");
        assert_eq!(v.system, "trade");
        assert_eq!(v.status, ViolationStatus::Open);
        assert_eq!(v.detail.column, "quantity");
        assert_eq!(v.detail.value, Value::Int(-50));
        assert_eq!(v.detail.severity, Some(Severity::Error));
        assert_eq!(v.detail.rule_name.as_deref(), Some("Range - Quantity"));
        Ok(())
    }

    #[test]
    fn test_gaps_yield_no_violations() -> anyhow::Result<()> {
        let engine = RuleEngine::default();
        let data = trades();

        let mut no_kind = Rule::new("R1", RuleKind::NotNull, "Quantity");
        no_kind.kind = None;
        assert!(engine.evaluate(&no_kind, "trade", &data)?.is_empty());

        let missing_column = Rule::new("R2", RuleKind::NotNull, "Price");
        assert!(engine.evaluate(&missing_column, "trade", &data)?.is_empty());

        let mut no_cde = Rule::new("R3", RuleKind::NotNull, "");
        no_cde.cde_name = None;
        assert!(engine.evaluate(&no_cde, "trade", &data)?.is_empty());

        let unsupported = Rule::new("R4", RuleKind::Unsupported("REFERENTIAL".into()), "Symbol");
        assert!(engine.evaluate(&unsupported, "trade", &data)?.is_empty());

        let bad_pattern = Rule::new("R5", RuleKind::Format, "Symbol")
            .with_definition(RuleParams::new().with("pattern", "[A-Z"));
        assert!(engine.evaluate(&bad_pattern, "trade", &data)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_identifier_field_skips() -> anyhow::Result<()> {
        let engine = RuleEngine::default();
        let data = Dataset::from_records(vec![record([("quantity", Value::Null)])]);
        let rule = Rule::new("R1", RuleKind::NotNull, "Quantity");
        assert!(engine.evaluate(&rule, "trade", &data)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_type_mismatch_is_isolated() -> anyhow::Result<()> {
        let engine = RuleEngine::default();
        let data = Dataset::from_records(vec![
            record([("uitid", Value::from("T001")), ("quantity", Value::from("ten"))]),
            record([("uitid", Value::from("T002")), ("quantity", Value::Int(-1))]),
        ]);
        let rule = Rule::new("R1", RuleKind::PositiveValue, "Quantity");
        assert!(engine.evaluate(&rule, "trade", &data)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_system_is_a_hard_error() {
        let engine = RuleEngine::default();
        let rule = Rule::new("R1", RuleKind::NotNull, "Quantity");
        let res = engine.evaluate(&rule, "ledger", &trades());
        assert!(matches!(res, Err(DomainError::UnknownSystem { system, .. }) if system == "ledger"));
    }
}
