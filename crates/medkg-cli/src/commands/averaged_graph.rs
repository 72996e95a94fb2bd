//! The averaged-graph command: cohort aggregation.

use crate::cli::AveragedGraphArgs;
use crate::config::Config;
use crate::error::Result;
use medkg_pipeline::{CohortConfig, CohortRun};
use medkg_store::SqliteSource;

/// Execute the averaged-graph command.
pub fn execute_averaged_graph(args: AveragedGraphArgs, config: &Config) -> Result<()> {
    let source = SqliteSource::open(&config.database_path)?;

    let cohort_config = CohortConfig {
        window_days: args.window.unwrap_or(config.window_days),
        threshold_pct: args.threshold.unwrap_or(config.threshold_pct),
        phenotype_code: args
            .phenotype
            .clone()
            .unwrap_or_else(|| config.phenotype_code.clone()),
        cohort_size: args.count,
        checkpoint_every: args.checkpoint_every.unwrap_or(config.checkpoint_every),
    };

    let run = CohortRun::new(&source, cohort_config, &args.output);
    let summary = run.run()?;

    println!(
        "Cohort of {}: {} distinct edges, {} retained ({} nodes)",
        summary.cohort_size,
        summary.distinct_edges,
        summary.retained_edges,
        summary.retained_nodes
    );
    if !summary.failed.is_empty() {
        println!("Failed patients:");
        for (id, reason) in &summary.failed {
            println!("  {id}: {reason}");
        }
    }

    Ok(())
}
