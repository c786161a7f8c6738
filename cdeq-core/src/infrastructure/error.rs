// cdeq-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(cdeq::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(cdeq::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    Yaml(#[from] serde_yaml::Error),

    // --- DATASETS ---
    #[error("JSON Error: {0}")]
    #[diagnostic(
        code(cdeq::infra::json),
        help("JSON datasets must be an array of flat objects.")
    )]
    Json(#[from] serde_json::Error),

    #[error("CSV Error: {0}")]
    #[diagnostic(
        code(cdeq::infra::csv),
        help("CSV datasets need a header row; every row must have the same number of cells.")
    )]
    Csv(#[from] csv::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(cdeq::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(cdeq::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Invalid project configuration: {0}")]
    #[diagnostic(
        code(cdeq::infra::validation),
        help("Fix the fields listed above in cdeq.yaml.")
    )]
    Validation(#[from] validator::ValidationErrors),
}
