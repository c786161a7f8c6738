pub mod files;

pub use files::{FileCatalogSource, FileDatasetSource};
