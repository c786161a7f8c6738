// cdeq/src/commands/run.rs
//
// USE CASE: Evaluate the catalog and reconcile systems.

use std::path::PathBuf;

use anyhow::Context;
use cdeq_core::infrastructure::fs::write_json;
use tracing::info;

use crate::cli::OutputFormat;
use crate::output;

pub async fn execute(
    project_dir: PathBuf,
    uitids: Vec<String>,
    format: OutputFormat,
    fail_on_violations: bool,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    let config = super::load_config(&project_dir)?;
    info!(project = %config.name, version = %config.version, "Configuration loaded");

    // B. Evaluate (Application Layer)
    let analysis = super::analyze(&project_dir, &config, uitids).await?;
    let run = &analysis.run;
    let table = run.reconciliation(&config.systems, &analysis.catalog);

    // C. Persist reports
    let target_dir = config.target_dir(&project_dir);
    let analysis_path = target_dir.join("analysis.json");
    let reconciliation_path = target_dir.join("reconciliation.json");
    write_json(&analysis_path, &run.export())
        .with_context(|| format!("Failed to write {:?}", analysis_path))?;
    write_json(&reconciliation_path, &table)
        .with_context(|| format!("Failed to write {:?}", reconciliation_path))?;

    match format {
        OutputFormat::Table => {
            println!("🔎 Project: {} (v{})", config.name, config.version);
            output::print_reconciliation(&table);
            output::print_summary(&run.summary);
            println!(
                "\n✨ {} violation(s) in {} reconciliation row(s), finished in {:.2?}",
                run.summary.total_violations,
                table.len(),
                start.elapsed()
            );
            println!("   Reports written to {}", target_dir.display());
        }
        OutputFormat::Json => {
            let body = serde_json::json!({
                "analysis": run.export(),
                "reconciliation": table,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    if fail_on_violations && run.summary.total_violations > 0 {
        eprintln!(
            "\n❌ FAILURE. {} violation(s) detected.",
            run.summary.total_violations
        );
        // Exit with error code for CI/CD
        std::process::exit(1);
    }

    Ok(())
}
