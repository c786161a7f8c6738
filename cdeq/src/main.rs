// cdeq/src/main.rs

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug cdeq run ... pour voir les détails
    // Logs go to stderr so `--format json` keeps stdout parseable.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            uitids,
            format,
            fail_on_violations,
        } => commands::run::execute(project_dir, uitids, format, fail_on_violations).await,
        Commands::Rules { project_dir } => commands::rules::execute(project_dir),
        Commands::Export {
            project_dir,
            output,
            uitids,
        } => commands::export::execute(project_dir, output, uitids).await,
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
