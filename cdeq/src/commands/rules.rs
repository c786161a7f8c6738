// cdeq/src/commands/rules.rs
//
// USE CASE: List the rule catalog.

use std::path::PathBuf;

use anyhow::Context;
use cdeq_core::infrastructure::config::load_catalog;

use crate::output;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let path = config.catalog_file(&project_dir);
    let catalog =
        load_catalog(&path).with_context(|| format!("Failed to load catalog {:?}", path))?;

    println!("📋 {} rule(s), {} CDE(s)", catalog.rules.len(), catalog.cdes.len());
    output::print_rules(&catalog);
    Ok(())
}
