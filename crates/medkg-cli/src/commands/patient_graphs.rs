//! The patient-graphs command: one exported graph per patient.

use crate::cli::PatientGraphsArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use medkg_domain::PatientId;
use medkg_pipeline::{cohort_patients, BatchConfig, PatientBatch};
use medkg_store::SqliteSource;

/// Execute the patient-graphs command.
pub fn execute_patient_graphs(args: PatientGraphsArgs, config: &Config) -> Result<()> {
    let source = SqliteSource::open(&config.database_path)?;

    let patients: Vec<PatientId> = if !args.patients.is_empty() {
        args.patients.iter().copied().map(PatientId::new).collect()
    } else if let Some(phenotype) = &args.phenotype {
        cohort_patients(&source, phenotype, args.count)?
    } else {
        return Err(CliError::InvalidInput(
            "provide --patients or --phenotype".to_string(),
        ));
    };

    let batch_config = BatchConfig {
        window_days: args.window.unwrap_or(config.window_days),
        export_views: args.views,
    };
    let stats_path = args
        .stats_file
        .clone()
        .unwrap_or_else(|| args.output.join("stats.csv"));

    let batch = PatientBatch::new(&source, batch_config, &args.output, stats_path);
    let summary = batch.run(&patients)?;

    println!(
        "Processed {} patients ({} skipped as already journaled)",
        summary.processed.len(),
        summary.skipped.len()
    );
    if !summary.is_clean() {
        println!("Failed patients:");
        for (id, reason) in &summary.failed {
            println!("  {id}: {reason}");
        }
    }

    Ok(())
}
