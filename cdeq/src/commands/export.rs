// cdeq/src/commands/export.rs
//
// USE CASE: Flat CSV export of the violations.

use std::path::PathBuf;

use anyhow::Context;
use cdeq_core::domain::report::ViolationRecord;
use cdeq_core::infrastructure::fs::atomic_write;

pub async fn execute(
    project_dir: PathBuf,
    output: Option<PathBuf>,
    uitids: Vec<String>,
) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let analysis = super::analyze(&project_dir, &config, uitids).await?;

    let path = output.unwrap_or_else(|| config.target_dir(&project_dir).join("violations.csv"));
    let records = analysis.run.records();
    let body = to_csv(&records)?;
    atomic_write(&path, body).with_context(|| format!("Failed to write {:?}", path))?;

    println!("📤 {} violation(s) exported to {}", records.len(), path.display());
    Ok(())
}

fn to_csv(records: &[ViolationRecord]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        // Header only, so downstream loaders still see the schema.
        writer.write_record([
            "rule_name",
            "rule_type",
            "severity",
            "system",
            "table",
            "column",
            "uitid",
            "value",
            "message",
            "timestamp",
        ])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e))
}
