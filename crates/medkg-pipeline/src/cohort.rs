//! Cohort aggregation runs: fold many patients' graphs into one averaged
//! graph.

use crate::checkpoint::TallyCheckpoint;
use crate::config::CohortConfig;
use crate::error::{PipelineError, Result};
use crate::patient::{build_patient_graph, fetch_literature, label_or_none};
use medkg_domain::traits::DataSource;
use medkg_domain::{GraphError, PatientId, TemporalValidator};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Outcome of a cohort run.
#[derive(Debug, Clone)]
pub struct CohortSummary {
    /// Number of patients in the sampled cohort (the strength denominator).
    pub cohort_size: usize,

    /// Distinct edge pairs seen across the cohort before thresholding.
    pub distinct_edges: usize,

    /// Edges surviving the threshold.
    pub retained_edges: usize,

    /// Nodes referenced by a retained edge.
    pub retained_nodes: usize,

    /// Patients whose unit of work failed, with the failure message.
    pub failed: Vec<(PatientId, String)>,
}

/// Seed a cohort: the distinct patients having any diagnosis mapped to the
/// phenotype, in id order, truncated to `count`.
///
/// Deterministic by construction (sorted distinct ids), so reruns sample
/// the same cohort.
pub fn cohort_patients<S: DataSource>(
    source: &S,
    phenotype_code: &str,
    count: usize,
) -> Result<Vec<PatientId>>
where
    S::Error: std::fmt::Display,
{
    let codes = source
        .phenotype_diagnoses(phenotype_code)
        .map_err(PipelineError::data_access)?;

    let mut patients: BTreeSet<PatientId> = BTreeSet::new();
    for code in &codes {
        patients.extend(
            source
                .patients_with_diagnosis(code)
                .map_err(PipelineError::data_access)?,
        );
    }

    Ok(patients.into_iter().take(count).collect())
}

/// Folds a sampled cohort into a recurrence tally, checkpointing as it
/// goes, and exports the threshold-filtered averaged graph.
pub struct CohortRun<'a, S> {
    source: &'a S,
    config: CohortConfig,
    output_dir: PathBuf,
}

impl<'a, S: DataSource> CohortRun<'a, S>
where
    S::Error: std::fmt::Display,
{
    /// Create a cohort run over `source`, exporting into `output_dir`.
    pub fn new(source: &'a S, config: CohortConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            config,
            output_dir: output_dir.into(),
        }
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join("tally_checkpoint.json")
    }

    /// Run the aggregation end to end.
    ///
    /// Parameter validation happens up front so a bad threshold or an empty
    /// cohort fails before any patient work. Per-patient failures are
    /// isolated; the tally accumulated from prior patients stays intact and
    /// the failed ids are reported in the summary.
    pub fn run(&self) -> Result<CohortSummary> {
        if self.config.cohort_size == 0 {
            return Err(GraphError::InvalidArgument(
                "cohort size must be positive".to_string(),
            )
            .into());
        }
        if !(0.0..=100.0).contains(&self.config.threshold_pct) {
            return Err(GraphError::InvalidArgument(format!(
                "threshold must be in [0, 100], got {}",
                self.config.threshold_pct
            ))
            .into());
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let validator = TemporalValidator::new(self.config.window_days)?;
        let literature = fetch_literature(self.source)?;
        let patients = cohort_patients(
            self.source,
            &self.config.phenotype_code,
            self.config.cohort_size,
        )?;
        // Requested size caps the sample; the phenotype population may be
        // smaller. The actual sample is the strength denominator.
        let cohort_size = patients.len();
        if cohort_size == 0 {
            return Err(GraphError::InvalidArgument(format!(
                "no patients found for phenotype {}",
                self.config.phenotype_code
            ))
            .into());
        }

        let checkpoint_path = self.checkpoint_path();
        let mut checkpoint = match TallyCheckpoint::load(&checkpoint_path)? {
            Some(existing) => {
                if !existing.matches_cohort(&patients) {
                    return Err(PipelineError::CheckpointMismatch(format!(
                        "{} was written for a different cohort; remove it or \
                         rerun with the original parameters",
                        checkpoint_path.display()
                    )));
                }
                tracing::info!(
                    absorbed = existing.absorbed.len(),
                    "resuming cohort run from checkpoint"
                );
                existing
            }
            None => TallyCheckpoint::new(patients.clone()),
        };

        let mut failed = Vec::new();
        let mut since_checkpoint = 0usize;

        for &id in &patients {
            if checkpoint.absorbed.contains(&id) {
                continue;
            }

            match build_patient_graph(self.source, &literature, id, &validator) {
                Ok(patient_graph) => {
                    checkpoint.tally.absorb(&patient_graph.graph);
                    checkpoint.absorbed.insert(id);
                    since_checkpoint += 1;
                    if since_checkpoint >= self.config.checkpoint_every.max(1) {
                        checkpoint.save(&checkpoint_path)?;
                        since_checkpoint = 0;
                    }
                }
                Err(e) => {
                    tracing::warn!(patient = %id, error = %e, "patient unit of work failed");
                    failed.push((id, e.to_string()));
                }
            }
        }

        let distinct_edges = checkpoint.tally.distinct_edges();
        let averaged = checkpoint
            .tally
            .clone()
            .finalize(cohort_size, self.config.threshold_pct)?;

        let label = |code: &str| label_or_none(self.source, code);
        let prefix = &self.config.phenotype_code;
        medkg_export::write_averaged_node_list(
            &self.output_dir.join(format!("{prefix}_nodelist.csv")),
            &averaged,
            label,
        )?;
        medkg_export::write_averaged_edge_list(
            &self.output_dir.join(format!("{prefix}_edgelist.csv")),
            &averaged,
        )?;

        // The run completed; the checkpoint has served its purpose.
        TallyCheckpoint::remove(&checkpoint_path)?;

        let summary = CohortSummary {
            cohort_size,
            distinct_edges,
            retained_edges: averaged.edges.len(),
            retained_nodes: averaged.nodes.len(),
            failed,
        };
        tracing::info!(
            cohort_size = summary.cohort_size,
            retained_edges = summary.retained_edges,
            failed = summary.failed.len(),
            "cohort run finished"
        );
        Ok(summary)
    }
}
