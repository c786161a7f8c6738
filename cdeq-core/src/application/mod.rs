// cdeq-core/src/application/mod.rs

pub mod analysis;
pub mod clean;
pub mod dispatcher;
pub mod driver;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use cdeq_core::application::{run_analysis, RuleEngine};`

pub use analysis::{Analysis, AnalysisOptions, AnalysisRun, run_analysis};
pub use clean::clean_project;
pub use dispatcher::RuleEngine;
pub use driver::evaluate_all_concurrent;
