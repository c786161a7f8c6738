// cdeq-core/src/application/clean.rs

use crate::error::CdeqError;
use crate::infrastructure::config::ProjectConfig;
use crate::infrastructure::config::project::is_project_relative;
use std::fs;
use std::path::Path;
use tracing::info;

/// Removes generated reports. Returns the targets actually deleted.
pub fn clean_project(project_dir: &Path, config: &ProjectConfig) -> Result<Vec<String>, CdeqError> {
    info!("🧹 Removing generated reports...");

    let mut targets = config.clean_targets.clone();
    if !targets.contains(&config.target_path) {
        targets.push(config.target_path.clone());
    }

    let mut removed = Vec::new();
    for target_rel_path in targets {
        let full_path = project_dir.join(&target_rel_path);

        // Zero-Trust Path Traversal Guard
        if !is_project_relative(&target_rel_path) || !full_path.starts_with(project_dir) {
            return Err(CdeqError::UnsafePath(target_rel_path));
        }

        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)?;
            } else {
                fs::remove_file(&full_path)?;
            }
            info!(target = %target_rel_path, "Artifact removed");
            removed.push(target_rel_path);
        }
    }

    Ok(removed)
}
