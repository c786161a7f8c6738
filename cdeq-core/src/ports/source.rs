// cdeq-core/src/ports/source.rs

use async_trait::async_trait;

use crate::domain::catalog::Catalog;
use crate::domain::dataset::DatasetMap;
use crate::domain::system::SystemRegistry;
use crate::error::CdeqError;

/// Supplies the rule/CDE catalog snapshot for one run.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_catalog(&self) -> Result<Catalog, CdeqError>;
}

/// Supplies one materialized dataset per system.
///
/// Failing here is the only way an analysis fails for lack of input.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load_datasets(&self, systems: &SystemRegistry) -> Result<DatasetMap, CdeqError>;
}
