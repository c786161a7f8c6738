// cdeq-core/src/infrastructure/config/project.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

use crate::domain::dataset::DEFAULT_ID_FIELD;
use crate::domain::predicate::EnumSets;
use crate::domain::resolver::ColumnMapping;
use crate::domain::system::SystemRegistry;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["cdeq_project.yaml", "cdeq.yaml"];

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Cross-system record key.
    #[serde(rename = "id-field", default = "default_id_field")]
    #[validate(length(min = 1, message = "Identifier field cannot be empty"))]
    pub id_field: String,

    #[serde(rename = "catalog-path", default = "default_catalog_path")]
    pub catalog_path: String,

    #[serde(rename = "data-path", default = "default_data_path")]
    pub data_path: String,

    /// Reports are written here and removed by `clean`, so it must stay
    /// inside the project.
    #[serde(rename = "target-path", default = "default_target_path")]
    #[validate(custom(function = "validate_project_relative"))]
    pub target_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 64))]
    pub concurrency: usize,

    #[serde(default)]
    #[validate(custom(function = "validate_systems"))]
    pub systems: SystemRegistry,

    #[serde(rename = "column-mapping", default)]
    pub column_mapping: ColumnMapping,

    #[serde(rename = "enum-sets", default)]
    pub enum_sets: EnumSets,
}

fn default_version() -> String {
    "1.0".to_string()
}
fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}
fn default_catalog_path() -> String {
    "catalog.yml".to_string()
}
fn default_data_path() -> String {
    "data".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}
fn default_concurrency() -> usize {
    4
}

/// Relative and free of `..` segments.
pub fn is_project_relative(raw: &str) -> bool {
    !Path::new(raw).is_absolute() && !raw.split(['/', '\\']).any(|part| part == "..")
}

fn validate_project_relative(raw: &str) -> Result<(), ValidationError> {
    if is_project_relative(raw) {
        Ok(())
    } else {
        Err(ValidationError::new("unsafe_path")
            .with_message(format!("'{}' must be a path inside the project", raw).into()))
    }
}

fn validate_systems(systems: &SystemRegistry) -> Result<(), ValidationError> {
    if systems.is_empty() {
        return Err(ValidationError::new("empty_systems")
            .with_message("At least one system must be declared".into()));
    }
    let mut seen = HashSet::new();
    for name in systems.names() {
        if !seen.insert(name) {
            return Err(ValidationError::new("duplicate_system")
                .with_message(format!("System '{}' is declared twice", name).into()));
        }
    }
    Ok(())
}

impl ProjectConfig {
    pub fn catalog_file(&self, project_dir: &Path) -> PathBuf {
        resolve_path(project_dir, &self.catalog_path)
    }

    pub fn data_dir(&self, project_dir: &Path) -> PathBuf {
        resolve_path(project_dir, &self.data_path)
    }

    pub fn target_dir(&self, project_dir: &Path) -> PathBuf {
        resolve_path(project_dir, &self.target_path)
    }
}

fn resolve_path(project_dir: &Path, raw: &str) -> PathBuf {
    let p = Path::new(raw);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        project_dir.join(p)
    }
}

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    load_project_config_with(project_dir, |key| std::env::var(key).ok())
}

/// Same as [`load_project_config`] with an injectable environment lookup.
pub fn load_project_config_with<F>(
    project_dir: &Path,
    env: F,
) -> Result<ProjectConfig, InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // Variables d'environnement par-dessus le fichier
    apply_env_overrides(&mut config, env)?;

    config.validate()?;
    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

fn apply_env_overrides<F>(config: &mut ProjectConfig, env: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = env("CDEQ_DATA_PATH") {
        info!(old = ?config.data_path, new = ?val, "Overriding data path via ENV");
        config.data_path = val;
    }
    if let Some(val) = env("CDEQ_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Some(val) = env("CDEQ_CONCURRENCY") {
        let parsed = val.trim().parse::<usize>().map_err(|e| {
            InfrastructureError::ConfigError(format!("CDEQ_CONCURRENCY='{}': {}", val, e))
        })?;
        info!(old = config.concurrency, new = parsed, "Overriding concurrency via ENV");
        config.concurrency = parsed;
    }
    Ok(())
}
