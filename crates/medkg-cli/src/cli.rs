//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// medkg - build per-patient knowledge graphs and cohort-averaged graphs.
#[derive(Debug, Parser)]
#[command(name = "medkg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long, global = true, env = "MEDKG_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build, validate and export one graph per patient
    PatientGraphs(PatientGraphsArgs),

    /// Aggregate a phenotype cohort into one averaged graph
    AveragedGraph(AveragedGraphArgs),
}

/// Arguments for the patient-graphs command.
#[derive(Debug, Parser)]
pub struct PatientGraphsArgs {
    /// Explicit patient ids to process
    #[arg(long, value_delimiter = ',')]
    pub patients: Vec<i64>,

    /// Seed the patient list from a phenotype code instead
    #[arg(short, long)]
    pub phenotype: Option<String>,

    /// Number of patients when seeding from a phenotype
    #[arg(short = 'n', long, default_value = "100")]
    pub count: usize,

    /// Output directory for the exported graphs
    #[arg(short, long)]
    pub output: PathBuf,

    /// Statistics file path (defaults to <output>/stats.csv)
    #[arg(long)]
    pub stats_file: Option<PathBuf>,

    /// Corroboration window in days (overrides the config file)
    #[arg(short, long)]
    pub window: Option<i64>,

    /// Also export the without-isolates and only-found views
    #[arg(long)]
    pub views: bool,
}

/// Arguments for the averaged-graph command.
#[derive(Debug, Parser)]
pub struct AveragedGraphArgs {
    /// Number of patients to sample from the phenotype population
    #[arg(short = 'n', long)]
    pub count: usize,

    /// Output directory for the averaged node/edge lists
    #[arg(short, long)]
    pub output: PathBuf,

    /// Recurrence threshold percentage (overrides the config file)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Phenotype code (overrides the config file)
    #[arg(short, long)]
    pub phenotype: Option<String>,

    /// Corroboration window in days (overrides the config file)
    #[arg(short, long)]
    pub window: Option<i64>,

    /// Checkpoint the running tally every this many patients
    #[arg(long)]
    pub checkpoint_every: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_graphs_parsing() {
        let cli = Cli::parse_from([
            "medkg",
            "patient-graphs",
            "--patients",
            "1,2,3",
            "--output",
            "reports",
        ]);
        match cli.command {
            Command::PatientGraphs(args) => {
                assert_eq!(args.patients, vec![1, 2, 3]);
                assert_eq!(args.output, PathBuf::from("reports"));
                assert!(!args.views);
            }
            _ => panic!("Expected PatientGraphs command"),
        }
    }

    #[test]
    fn test_averaged_graph_parsing() {
        let cli = Cli::parse_from([
            "medkg",
            "averaged-graph",
            "-n",
            "500",
            "--output",
            "averaged",
            "--threshold",
            "25",
        ]);
        match cli.command {
            Command::AveragedGraph(args) => {
                assert_eq!(args.count, 500);
                assert_eq!(args.threshold, Some(25.0));
                assert_eq!(args.phenotype, None);
            }
            _ => panic!("Expected AveragedGraph command"),
        }
    }

    #[test]
    fn test_global_db_override() {
        let cli = Cli::parse_from([
            "medkg",
            "--db",
            "pop.db",
            "patient-graphs",
            "--patients",
            "1",
            "--output",
            "out",
        ]);
        assert_eq!(cli.db, Some(PathBuf::from("pop.db")));
    }
}
