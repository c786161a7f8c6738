// cdeq-core/src/ports/mod.rs

// What the analysis needs from the outside world, without knowing where it
// comes from (files, a catalog service, a warehouse extract).

pub mod source;

pub use source::{CatalogSource, DatasetSource};
