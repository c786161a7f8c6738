// cdeq-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod datasets;
pub mod error;
pub mod fs;
