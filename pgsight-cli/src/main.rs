use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use pgsight_core::ReportError;

fn main() {
    // Pick up PGSIGHT_* connection variables from a local .env if present
    dotenv::dotenv().ok();

    // Initialize logging with PGSIGHT_LOG environment variable support
    let log_level = std::env::var("PGSIGHT_LOG").unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<ReportError>() {
            Some(ReportError::Validation(_))
            | Some(ReportError::DefinitionNotFound(_))
            | Some(ReportError::InvalidDurationFormat(_)) => 2,
            Some(ReportError::Io(_)) => 3,
            Some(ReportError::TemplateRender(_))
            | Some(ReportError::UnsupportedFormat(_))
            | Some(ReportError::Serialization(_)) => 4,
            Some(ReportError::Connection(_)) => 5,
            Some(ReportError::Tunnel(_)) => 6,
            Some(ReportError::QueryExecution(_))
            | Some(ReportError::UnsupportedServiceType(_))
            | Some(ReportError::ReportExecution { .. }) => 7,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Pg(args) => crate::cli::commands::pg::run(args),
        Commands::Rds(args) => crate::cli::commands::rds::run(args),
    }
}
