// cdeq-core/src/infrastructure/adapters/files.rs

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::catalog::Catalog;
use crate::domain::dataset::{DEFAULT_ID_FIELD, DatasetMap};
use crate::domain::system::SystemRegistry;
use crate::error::CdeqError;
use crate::infrastructure::config::load_catalog;
use crate::infrastructure::datasets::load_datasets;
use crate::ports::{CatalogSource, DatasetSource};

/// `catalog.yml` on disk.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    pub path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn load_catalog(&self) -> Result<Catalog, CdeqError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_catalog(&path))
            .await
            .map_err(|e| CdeqError::InternalError(format!("Catalog loader panicked: {}", e)))?
    }
}

/// A directory of `<system>.csv` / `<system>.json` extracts.
#[derive(Debug, Clone)]
pub struct FileDatasetSource {
    pub dir: PathBuf,
    pub id_field: String,
}

impl FileDatasetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }
}

#[async_trait]
impl DatasetSource for FileDatasetSource {
    async fn load_datasets(&self, systems: &SystemRegistry) -> Result<DatasetMap, CdeqError> {
        let dir = self.dir.clone();
        let id_field = self.id_field.clone();
        let systems = systems.clone();
        tokio::task::spawn_blocking(move || load_datasets(&dir, &systems, &id_field))
            .await
            .map_err(|e| CdeqError::InternalError(format!("Dataset loader panicked: {}", e)))?
            .map_err(CdeqError::from)
    }
}
