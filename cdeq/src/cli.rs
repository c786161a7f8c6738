// cdeq/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cdeq")]
#[command(about = "Critical Data Element quality checks and cross-system reconciliation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Evaluates the rule catalog against every system and reconciles the results
    Run {
        /// Project directory
        #[arg(long, default_value = ".", env = "CDEQ_PROJECT_DIR")]
        project_dir: PathBuf,

        /// Only analyze these record ids (repeatable)
        #[arg(long = "uitid", value_name = "ID")]
        uitids: Vec<String>,

        /// Output format: table | json
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Exit with error if any violation is found
        #[arg(long)]
        fail_on_violations: bool,
    },

    /// 📋 Lists the rules of the catalog
    Rules {
        #[arg(long, default_value = ".", env = "CDEQ_PROJECT_DIR")]
        project_dir: PathBuf,
    },

    /// 📤 Evaluates and writes one flat CSV row per violation
    Export {
        #[arg(long, default_value = ".", env = "CDEQ_PROJECT_DIR")]
        project_dir: PathBuf,

        /// Destination file (default: <target-path>/violations.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Only analyze these record ids (repeatable)
        #[arg(long = "uitid", value_name = "ID")]
        uitids: Vec<String>,
    },

    /// 🧹 Removes generated reports (target/ folder)
    Clean {
        #[arg(long, default_value = ".", env = "CDEQ_PROJECT_DIR")]
        project_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["cdeq", "run"]);
        match args.command {
            Commands::Run {
                uitids,
                format,
                fail_on_violations,
                ..
            } => {
                assert!(uitids.is_empty());
                assert_eq!(format, OutputFormat::Table);
                assert!(!fail_on_violations);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_filters() -> Result<()> {
        let args = Cli::parse_from([
            "cdeq",
            "run",
            "--uitid",
            "T001",
            "--uitid",
            "T003",
            "--format",
            "json",
            "--fail-on-violations",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                uitids,
                format,
                fail_on_violations,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(uitids, vec!["T001".to_string(), "T003".to_string()]);
                assert_eq!(format, OutputFormat::Json);
                assert!(fail_on_violations);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_export() -> Result<()> {
        let args = Cli::parse_from(["cdeq", "export", "-o", "out.csv"]);
        match args.command {
            Commands::Export { output, .. } => {
                assert_eq!(output, Some(PathBuf::from("out.csv")));
                Ok(())
            }
            _ => bail!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["cdeq", "run", "--format", "xml"]).is_err());
    }
}
