// cdeq/src/commands/mod.rs

pub mod clean;
pub mod export;
pub mod rules;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cdeq_core::application::{Analysis, AnalysisOptions, RuleEngine, run_analysis};
use cdeq_core::infrastructure::adapters::{FileCatalogSource, FileDatasetSource};
use cdeq_core::infrastructure::config::{ProjectConfig, load_project_config};

/// Loads the project file, printing the full diagnostic on failure.
pub fn load_config(project_dir: &Path) -> anyhow::Result<ProjectConfig> {
    load_project_config(project_dir).map_err(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        anyhow::anyhow!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })
}

/// Wires the file adapters into one analysis run.
pub async fn analyze(
    project_dir: &Path,
    config: &ProjectConfig,
    uitids: Vec<String>,
) -> anyhow::Result<Analysis> {
    let engine = Arc::new(RuleEngine::from(config));
    let catalogs = FileCatalogSource::new(config.catalog_file(project_dir));
    let sources =
        FileDatasetSource::new(config.data_dir(project_dir)).with_id_field(&config.id_field);
    let options = AnalysisOptions {
        record_filter: (!uitids.is_empty()).then_some(uitids),
        concurrency: config.concurrency,
    };

    run_analysis(&catalogs, &sources, engine, options)
        .await
        .with_context(|| format!("Analysis failed for project {:?}", project_dir))
}
