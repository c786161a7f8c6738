// cdeq-core/src/application/analysis.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::dispatcher::RuleEngine;
use crate::application::driver::evaluate_all_concurrent;
use crate::domain::catalog::Catalog;
use crate::domain::report::{ReconciliationTable, ViolationRecord, ViolationSummary};
use crate::domain::system::SystemRegistry;
use crate::domain::violation::Violation;
use crate::error::CdeqError;
use crate::infrastructure::config::ProjectConfig;
use crate::ports::{CatalogSource, DatasetSource};

impl From<&ProjectConfig> for RuleEngine {
    fn from(config: &ProjectConfig) -> Self {
        RuleEngine::new(
            config.column_mapping.clone(),
            config.systems.clone(),
            config.id_field.clone(),
            config.enum_sets.clone(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Restrict evaluation to these record ids. `None` means all records.
    pub record_filter: Option<Vec<String>>,
    pub concurrency: usize,
}

/// Result of one evaluation run, owned by the caller.
///
/// Nothing here outlives the caller: a new run builds a new context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub record_filter: Option<Vec<String>>,
    pub violations: Vec<Violation>,
    pub summary: ViolationSummary,
}

/// On-disk shape of `target/analysis.json`.
#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a> {
    pub run_id: Uuid,
    pub total_violations: usize,
    pub violations: &'a [Violation],
    pub summary: &'a ViolationSummary,
    pub timestamp: DateTime<Utc>,
    pub uitids_analyzed: Option<&'a [String]>,
}

impl AnalysisRun {
    pub fn export(&self) -> AnalysisExport<'_> {
        AnalysisExport {
            run_id: self.run_id,
            total_violations: self.violations.len(),
            violations: &self.violations,
            summary: &self.summary,
            timestamp: self.finished_at,
            uitids_analyzed: self.record_filter.as_deref(),
        }
    }

    pub fn reconciliation(&self, systems: &SystemRegistry, catalog: &Catalog) -> ReconciliationTable {
        ReconciliationTable::compact(&self.violations, systems, catalog)
    }

    pub fn records(&self) -> Vec<ViolationRecord> {
        self.violations.iter().map(ViolationRecord::from).collect()
    }
}

/// Catalog snapshot plus the run evaluated against it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub catalog: Catalog,
    pub run: AnalysisRun,
}

#[instrument(skip_all, fields(concurrency = options.concurrency))]
pub async fn run_analysis<C, D>(
    catalogs: &C,
    sources: &D,
    engine: Arc<RuleEngine>,
    options: AnalysisOptions,
) -> Result<Analysis, CdeqError>
where
    C: CatalogSource + ?Sized,
    D: DatasetSource + ?Sized,
{
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();
    info!(%run_id, "Starting analysis");

    let catalog = catalogs.load_catalog().await?;
    let mut datasets = sources.load_datasets(&engine.systems).await?;

    let record_filter = options.record_filter.filter(|ids| !ids.is_empty());
    if let Some(ids) = &record_filter {
        let wanted: HashSet<String> = ids.iter().cloned().collect();
        for (system, dataset) in datasets.iter_mut() {
            dataset.retain_ids(&engine.id_field, &wanted);
            info!(system, records = dataset.len(), "Record filter applied");
        }
    }

    let rules = Arc::new(catalog.rules.clone());
    let violations = evaluate_all_concurrent(
        engine.clone(),
        rules,
        Arc::new(datasets),
        options.concurrency,
    )
    .await?;

    let summary = ViolationSummary::summarize(&violations);
    info!(%run_id, total = summary.total_violations, "Analysis finished");

    Ok(Analysis {
        catalog,
        run: AnalysisRun {
            run_id,
            started_at,
            finished_at: Utc::now(),
            record_filter,
            violations,
            summary,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Rule, RuleKind, RuleParams};
    use crate::domain::dataset::{Dataset, DatasetMap, Value, record};
    use async_trait::async_trait;

    struct InMemory {
        catalog: Catalog,
        datasets: DatasetMap,
    }

    #[async_trait]
    impl CatalogSource for InMemory {
        async fn load_catalog(&self) -> Result<Catalog, CdeqError> {
            Ok(self.catalog.clone())
        }
    }

    #[async_trait]
    impl DatasetSource for InMemory {
        async fn load_datasets(&self, _systems: &SystemRegistry) -> Result<DatasetMap, CdeqError> {
            Ok(self.datasets.clone())
        }
    }

    fn fixture() -> InMemory {
        let rules = vec![
            Rule::new("DQ001", RuleKind::Range, "Quantity")
                .with_definition(RuleParams::new().with("min", 0))
                .with_systems(["trade", "settlement"]),
            Rule::new("DQ002", RuleKind::Unsupported("REFERENTIAL".into()), "Symbol"),
            Rule::new("DQ003", RuleKind::NotNull, "Symbol"),
        ];
        let trade = Dataset::from_records(vec![
            record([("uitid", Value::from("T001")), ("quantity", Value::Int(5)), ("symbol", Value::Null)]),
            record([("uitid", Value::from("T003")), ("quantity", Value::Int(-50)), ("symbol", Value::from("IBM"))]),
        ]);
        let settlement = Dataset::from_records(vec![
            record([("uitid", Value::from("T001")), ("quantity", Value::Int(5)), ("symbol", Value::from("AAPL"))]),
        ]);
        InMemory {
            catalog: Catalog::new(Vec::new(), rules).unwrap(),
            datasets: [("trade", trade), ("settlement", settlement)].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_run_analysis() -> anyhow::Result<()> {
        let source = fixture();
        let engine = Arc::new(RuleEngine::default());
        let options = AnalysisOptions {
            record_filter: None,
            concurrency: 4,
        };

        let analysis = run_analysis(&source, &source, engine.clone(), options).await?;
        let run = &analysis.run;
        assert_eq!(run.violations.len(), 2);
        assert_eq!(run.summary.total_violations, 2);
        assert!(run.finished_at >= run.started_at);

        let table = run.reconciliation(&engine.systems, &analysis.catalog);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].uitid, "T003");

        let export = serde_json::to_value(run.export())?;
        assert_eq!(export["total_violations"], 2);
        assert!(export["uitids_analyzed"].is_null());
        assert_eq!(run.records().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_filter_restricts_datasets() -> anyhow::Result<()> {
        let source = fixture();
        let options = AnalysisOptions {
            record_filter: Some(vec!["T001".into()]),
            concurrency: 2,
        };

        let analysis =
            run_analysis(&source, &source, Arc::new(RuleEngine::default()), options).await?;
        let ids: Vec<&str> = analysis.run.violations.iter().map(|v| v.uitid.as_str()).collect();
        assert_eq!(ids, vec!["T001"]);
        assert_eq!(analysis.run.export().uitids_analyzed, Some(&["T001".to_string()][..]));
        Ok(())
    }
}
