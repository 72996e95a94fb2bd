//! Patient-graph batches: many patients, one exported graph each.

use crate::config::BatchConfig;
use crate::error::Result;
use crate::patient::{build_patient_graph, fetch_literature, label_or_none, PatientGraph};
use medkg_domain::traits::DataSource;
use medkg_domain::{GraphView, PatientId, TemporalValidator};
use medkg_export::{StatsRecord, StatsWriter};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Outcome of a patient-graph batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Patients processed in this invocation.
    pub processed: Vec<PatientId>,

    /// Patients skipped because the statistics journal already had them.
    pub skipped: Vec<PatientId>,

    /// Patients whose unit of work failed, with the failure message.
    pub failed: Vec<(PatientId, String)>,
}

impl BatchSummary {
    /// Whether every attempted patient succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs patient units of work against a data source, exporting one node
/// list and one edge list per patient and journaling statistics.
///
/// Failures are isolated per patient: the run continues, failed ids are
/// collected into the summary, and nothing already exported is touched.
pub struct PatientBatch<'a, S> {
    source: &'a S,
    config: BatchConfig,
    output_dir: PathBuf,
    stats: StatsWriter,
}

impl<'a, S: DataSource> PatientBatch<'a, S>
where
    S::Error: std::fmt::Display,
{
    /// Create a batch over `source`, exporting into `output_dir` and
    /// journaling statistics at `stats_path`.
    pub fn new(
        source: &'a S,
        config: BatchConfig,
        output_dir: impl Into<PathBuf>,
        stats_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            config,
            output_dir: output_dir.into(),
            stats: StatsWriter::new(stats_path.into()),
        }
    }

    /// Process the given patients, skipping those already journaled.
    pub fn run(&self, patients: &[PatientId]) -> Result<BatchSummary> {
        std::fs::create_dir_all(&self.output_dir)?;
        let validator = TemporalValidator::new(self.config.window_days)?;
        let literature = fetch_literature(self.source)?;
        let completed: BTreeSet<PatientId> =
            self.stats.completed_patients()?.into_iter().collect();

        let mut summary = BatchSummary::default();

        for &id in patients {
            if completed.contains(&id) {
                tracing::debug!(patient = %id, "already journaled, skipping");
                summary.skipped.push(id);
                continue;
            }

            match build_patient_graph(self.source, &literature, id, &validator) {
                Ok(patient_graph) => {
                    match self.export_patient(&patient_graph) {
                        Ok(()) => summary.processed.push(id),
                        Err(e) => {
                            tracing::warn!(patient = %id, error = %e, "export failed");
                            summary.failed.push((id, e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(patient = %id, error = %e, "patient unit of work failed");
                    summary.failed.push((id, e.to_string()));
                }
            }
        }

        tracing::info!(
            processed = summary.processed.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "patient batch finished"
        );
        Ok(summary)
    }

    /// Write a patient's exports and append the statistics row. The row
    /// goes last so an interrupted export is retried on resume.
    fn export_patient(&self, patient: &PatientGraph) -> Result<()> {
        let label = |code: &str| label_or_none(self.source, code);

        medkg_export::write_node_list(
            &self.patient_path(patient.id, None, "nodelist"),
            &patient.graph,
            label,
        )?;
        medkg_export::write_edge_list(
            &self.patient_path(patient.id, None, "edgelist"),
            &patient.graph,
        )?;

        if self.config.export_views {
            for view in [GraphView::ConnectedOnly, GraphView::FoundOnly] {
                let projected = view.apply(&patient.graph, &patient.found)?;
                medkg_export::write_node_list(
                    &self.patient_path(patient.id, Some(view), "nodelist"),
                    &projected,
                    label,
                )?;
                medkg_export::write_edge_list(
                    &self.patient_path(patient.id, Some(view), "edgelist"),
                    &projected,
                )?;
            }
        }

        let (nodes, edges, found_edges) = patient.stats();
        self.stats.append(&StatsRecord {
            patient_id: patient.id.value(),
            nodes,
            edges,
            found_edges,
        })?;
        Ok(())
    }

    fn patient_path(&self, id: PatientId, view: Option<GraphView>, list: &str) -> PathBuf {
        let name = match view {
            Some(view) => format!("{id}_{}_{list}.csv", view.as_str()),
            None => format!("{id}_{list}.csv"),
        };
        Path::new(&self.output_dir).join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockSource;
    use chrono::NaiveDate;
    use medkg_domain::{DiagnosisEvent, DrugEvent};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn mock_with_one_match() -> MockSource {
        let mut source = MockSource::default();
        source.drug_disease.push(("Rx1".into(), "D1".into()));
        source
            .drugs
            .insert(PatientId::new(1), vec![DrugEvent::new("Rx1", date("2020-02-01"))]);
        source.diagnoses.insert(
            PatientId::new(1),
            vec![DiagnosisEvent::new("D1", date("2020-01-01"))],
        );
        source
    }

    #[test]
    fn test_batch_exports_and_journals() {
        let dir = tempfile::tempdir().unwrap();
        let stats_path = dir.path().join("stats.csv");
        let source = mock_with_one_match();

        let batch = PatientBatch::new(
            &source,
            BatchConfig::default(),
            dir.path().join("graphs"),
            &stats_path,
        );
        let summary = batch.run(&[PatientId::new(1)]).unwrap();

        assert_eq!(summary.processed, vec![PatientId::new(1)]);
        assert!(summary.is_clean());
        assert!(dir.path().join("graphs/1_nodelist.csv").exists());
        assert!(dir.path().join("graphs/1_edgelist.csv").exists());

        let edge_list =
            std::fs::read_to_string(dir.path().join("graphs/1_edgelist.csv")).unwrap();
        assert!(edge_list.contains("D1,Rx1,drug_diagnosis,found"));

        let stats = std::fs::read_to_string(&stats_path).unwrap();
        assert!(stats.contains("1,2,1,1"));
    }

    #[test]
    fn test_batch_resume_skips_journaled_patients() {
        let dir = tempfile::tempdir().unwrap();
        let stats_path = dir.path().join("stats.csv");
        let source = mock_with_one_match();

        let batch = PatientBatch::new(
            &source,
            BatchConfig::default(),
            dir.path().join("graphs"),
            &stats_path,
        );
        batch.run(&[PatientId::new(1)]).unwrap();

        // Second invocation: nothing to redo
        let summary = batch.run(&[PatientId::new(1)]).unwrap();
        assert!(summary.processed.is_empty());
        assert_eq!(summary.skipped, vec![PatientId::new(1)]);

        let stats = std::fs::read_to_string(&stats_path).unwrap();
        assert_eq!(stats.lines().count(), 2, "no duplicate rows after resume");
    }

    #[test]
    fn test_batch_isolates_per_patient_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = mock_with_one_match();
        source.failing.insert(PatientId::new(2));

        let batch = PatientBatch::new(
            &source,
            BatchConfig::default(),
            dir.path().join("graphs"),
            dir.path().join("stats.csv"),
        );
        let summary = batch
            .run(&[PatientId::new(2), PatientId::new(1)])
            .unwrap();

        // Patient 2 failed first, patient 1 still completed
        assert_eq!(summary.processed, vec![PatientId::new(1)]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, PatientId::new(2));
    }

    #[test]
    fn test_batch_view_exports() {
        let dir = tempfile::tempdir().unwrap();
        let source = mock_with_one_match();

        let config = BatchConfig {
            export_views: true,
            ..Default::default()
        };
        let batch = PatientBatch::new(
            &source,
            config,
            dir.path().join("graphs"),
            dir.path().join("stats.csv"),
        );
        batch.run(&[PatientId::new(1)]).unwrap();

        assert!(dir
            .path()
            .join("graphs/1_without-isolates_edgelist.csv")
            .exists());
        assert!(dir.path().join("graphs/1_only-found_nodelist.csv").exists());
    }
}
