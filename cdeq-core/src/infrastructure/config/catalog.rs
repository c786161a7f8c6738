// cdeq-core/src/infrastructure/config/catalog.rs

use std::fs;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::domain::catalog::Catalog;
use crate::error::CdeqError;
use crate::infrastructure::error::InfrastructureError;

/// Loads and validates `catalog.yml`.
#[instrument]
pub fn load_catalog(path: &Path) -> Result<Catalog, CdeqError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(path.display().to_string()).into());
    }
    let content = fs::read_to_string(path)?;
    let catalog: Catalog = serde_yaml::from_str(&content).map_err(InfrastructureError::from)?;
    catalog.validate()?;

    for rule in &catalog.rules {
        if let Some(kind) = &rule.kind
            && !kind.is_supported()
        {
            warn!(rule_id = %rule.id, kind = %kind, "Unsupported rule kind, it will be skipped");
        }
    }
    info!(cdes = catalog.cdes.len(), rules = catalog.rules.len(), "Catalog loaded");
    Ok(catalog)
}
