//! medkg CLI - build patient knowledge graphs from the command line.

use anyhow::Result;
use clap::Parser;
use medkg_cli::commands;
use medkg_cli::{Cli, Command, Config};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    match cli.command {
        Command::PatientGraphs(args) => commands::execute_patient_graphs(args, &config)?,
        Command::AveragedGraph(args) => commands::execute_averaged_graph(args, &config)?,
    }

    Ok(())
}
