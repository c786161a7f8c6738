// cdeq-core/src/application/driver.rs

use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::application::dispatcher::RuleEngine;
use crate::domain::catalog::Rule;
use crate::domain::dataset::DatasetMap;
use crate::domain::error::DomainError;
use crate::domain::violation::Violation;

/// One (rule, system) unit of work. The indices restore report order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pair {
    rule_idx: usize,
    system_idx: usize,
    system: String,
}

/// Expands the catalog into the (rule, system) pairs that have data.
fn plan(rules: &[Rule], datasets: &DatasetMap) -> Vec<Pair> {
    let available: Vec<&str> = datasets.systems().collect();
    let mut pairs = Vec::new();

    for (rule_idx, rule) in rules.iter().enumerate() {
        for (system_idx, system) in rule.target_systems(&available).into_iter().enumerate() {
            match datasets.get(system) {
                Some(dataset) if !dataset.is_empty() => pairs.push(Pair {
                    rule_idx,
                    system_idx,
                    system: system.to_string(),
                }),
                Some(_) => warn!(rule_id = %rule.id, system, "Dataset is empty, skipping"),
                None => warn!(rule_id = %rule.id, system, "No dataset for system, skipping"),
            }
        }
    }
    pairs
}

impl RuleEngine {
    /// Evaluates every rule against every targeted system, in catalog order,
    /// then per-rule system order, then row order.
    #[instrument(skip_all, fields(rules = rules.len(), systems = datasets.len()))]
    pub fn evaluate_all(
        &self,
        rules: &[Rule],
        datasets: &DatasetMap,
    ) -> Result<Vec<Violation>, DomainError> {
        let mut violations = Vec::new();
        for pair in plan(rules, datasets) {
            let rule = &rules[pair.rule_idx];
            if let Some(dataset) = datasets.get(&pair.system) {
                violations.extend(self.evaluate(rule, &pair.system, dataset)?);
            }
        }
        info!(total = violations.len(), "Evaluation complete");
        Ok(violations)
    }
}

/// Same contract as [`RuleEngine::evaluate_all`], fanned out over a
/// bounded pool of blocking tasks.
///
/// A panicking pair is logged and contributes nothing. Partial results are
/// merged only after every pair has finished.
#[instrument(skip_all, fields(rules = rules.len(), systems = datasets.len(), concurrency = concurrency))]
pub async fn evaluate_all_concurrent(
    engine: Arc<RuleEngine>,
    rules: Arc<Vec<Rule>>,
    datasets: Arc<DatasetMap>,
    concurrency: usize,
) -> Result<Vec<Violation>, DomainError> {
    let pairs = plan(&rules, &datasets);
    info!(pairs = pairs.len(), "Dispatching rule evaluations");

    let tasks = pairs.into_iter().map(|pair| {
        let engine = engine.clone();
        let rules = rules.clone();
        let datasets = datasets.clone();

        async move {
            let key = (pair.rule_idx, pair.system_idx);
            let rule_id = rules[pair.rule_idx].id.clone();
            let system = pair.system.clone();

            let joined = tokio::task::spawn_blocking(move || match datasets.get(&pair.system) {
                Some(dataset) => engine.evaluate(&rules[pair.rule_idx], &pair.system, dataset),
                None => Ok(Vec::new()),
            })
            .await;

            (key, settle(joined, &rule_id, &system))
        }
    });

    let mut partials: Vec<((usize, usize), Result<Vec<Violation>, DomainError>)> =
        futures::stream::iter(tasks)
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

    partials.sort_by_key(|(key, _)| *key);

    let mut violations = Vec::new();
    for (_, result) in partials {
        violations.extend(result?);
    }
    info!(total = violations.len(), "Evaluation complete");
    Ok(violations)
}

/// A task that panicked or was cancelled counts as zero violations.
/// Requires the unwinding panic strategy (see the release profile).
fn settle(
    joined: Result<Result<Vec<Violation>, DomainError>, tokio::task::JoinError>,
    rule_id: &str,
    system: &str,
) -> Result<Vec<Violation>, DomainError> {
    match joined {
        Ok(result) => result,
        Err(join_err) => {
            error!(rule_id, system, error = %join_err, "Rule evaluation task failed");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::catalog::{RuleKind, RuleParams};
    use crate::domain::dataset::{Dataset, Value, record};

    fn datasets() -> DatasetMap {
        let trade = Dataset::from_records(vec![
            record([("uitid", Value::from("T001")), ("quantity", Value::Int(10)), ("symbol", Value::Null)]),
            record([("uitid", Value::from("T003")), ("quantity", Value::Int(-50)), ("symbol", Value::from("IBM"))]),
        ]);
        let settlement = Dataset::from_records(vec![
            record([("uitid", Value::from("T001")), ("quantity", Value::Int(10)), ("symbol", Value::Null)]),
        ]);
        let reporting = Dataset::from_records(vec![
            record([("uitid", Value::from("T001")), ("quantity", Value::Int(0)), ("symbol", Value::Null)]),
        ]);
        [("trade", trade), ("settlement", settlement), ("reporting", reporting)]
            .into_iter()
            .collect()
    }

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("R1", RuleKind::NotNull, "Symbol"),
            Rule::new("R2", RuleKind::Unsupported("REFERENTIAL".into()), "Symbol"),
            Rule::new("R3", RuleKind::PositiveValue, "Quantity")
                .with_systems(["reporting", "trade"]),
        ]
    }

    fn keys(violations: &[Violation]) -> Vec<(String, String, String)> {
        violations
            .iter()
            .map(|v| (v.rule_id.clone(), v.system.clone(), v.uitid.clone()))
            .collect()
    }

    #[test]
    fn test_order_follows_catalog_then_systems() -> anyhow::Result<()> {
        let violations = RuleEngine::default().evaluate_all(&rules(), &datasets())?;
        let expected = vec![
            ("R1", "trade", "T001"),
            ("R1", "settlement", "T001"),
            ("R1", "reporting", "T001"),
            ("R3", "reporting", "T001"),
            ("R3", "trade", "T003"),
        ];
        let expected: Vec<(String, String, String)> = expected
            .into_iter()
            .map(|(a, b, c)| (a.into(), b.into(), c.into()))
            .collect();
        assert_eq!(keys(&violations), expected);
        Ok(())
    }

    #[test]
    fn test_absent_and_empty_datasets_are_skipped() -> anyhow::Result<()> {
        let mut data = DatasetMap::new();
        data.insert("trade", Dataset::default());
        let rules = vec![Rule::new("R1", RuleKind::NotNull, "Symbol").with_systems(["trade", "settlement"])];
        assert!(RuleEngine::default().evaluate_all(&rules, &data)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_scenario_quantity_range() -> anyhow::Result<()> {
        let rules = vec![
            Rule::new("R1", RuleKind::Range, "Quantity")
                .with_definition(RuleParams::new().with("min", 0))
                .with_systems(["trade", "settlement"]),
        ];
        let violations = RuleEngine::default().evaluate_all(&rules, &datasets())?;
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].system, "trade");
        assert_eq!(violations[0].uitid, "T003");
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() -> anyhow::Result<()> {
        let engine = Arc::new(RuleEngine::default());
        let rules = Arc::new(rules());
        let data = Arc::new(datasets());

        let sequential = engine.evaluate_all(&rules, &data)?;
        for concurrency in [1, 2, 8] {
            let concurrent =
                evaluate_all_concurrent(engine.clone(), rules.clone(), data.clone(), concurrency)
                    .await?;
            assert_eq!(keys(&concurrent), keys(&sequential));
            assert!(
                concurrent
                    .iter()
                    .zip(&sequential)
                    .all(|(a, b)| a.same_finding(b))
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_panicking_task_contributes_nothing() -> anyhow::Result<()> {
        let joined = tokio::task::spawn_blocking(|| -> Result<Vec<Violation>, DomainError> {
            panic!("predicate blew up")
        })
        .await;
        assert!(joined.as_ref().is_err_and(|e| e.is_panic()));
        assert!(settle(joined, "R1", "trade")?.is_empty());

        let ok = tokio::task::spawn_blocking(|| RuleEngine::default().evaluate_all(&rules(), &datasets())).await;
        assert_eq!(settle(ok, "R1", "trade")?.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_surfaces_unknown_system() {
        let mut data = datasets();
        data.insert("ledger", Dataset::from_records(vec![record([
            ("uitid", Value::from("L1")),
            ("symbol", Value::Null),
        ])]));
        let res = evaluate_all_concurrent(
            Arc::new(RuleEngine::default()),
            Arc::new(vec![Rule::new("R1", RuleKind::NotNull, "Symbol")]),
            Arc::new(data),
            4,
        )
        .await;
        assert!(matches!(res, Err(DomainError::UnknownSystem { .. })));
    }
}
