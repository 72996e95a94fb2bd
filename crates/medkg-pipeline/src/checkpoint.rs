//! Running-tally checkpoints for cohort runs.
//!
//! A cohort pass over thousands of patients should not lose everything to a
//! crash near the end. The sampled cohort, the running tally and the ids
//! already absorbed are written to JSON at a configurable cadence; a
//! restarted run loads the file, skips the absorbed ids and keeps folding.
//! The checkpoint is only valid for the exact cohort it was written for -
//! a restart with different parameters must not mix tallies.

use crate::error::Result;
use medkg_domain::{CohortTally, PatientId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Persisted state of an in-progress cohort run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyCheckpoint {
    /// The sampled cohort this checkpoint belongs to, in processing order.
    pub cohort: Vec<PatientId>,

    /// The running recurrence tally.
    pub tally: CohortTally,

    /// Patients already folded into the tally.
    pub absorbed: BTreeSet<PatientId>,
}

impl TallyCheckpoint {
    /// Create an empty checkpoint for the given sampled cohort.
    pub fn new(cohort: Vec<PatientId>) -> Self {
        Self {
            cohort,
            tally: CohortTally::new(),
            absorbed: BTreeSet::new(),
        }
    }

    /// Whether this checkpoint was written for the given cohort. Counts
    /// folded into the tally are meaningless against any other sample.
    pub fn matches_cohort(&self, cohort: &[PatientId]) -> bool {
        self.cohort == cohort
    }
    /// Load a checkpoint if one exists at `path`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let checkpoint = serde_json::from_str(&contents)?;
        Ok(Some(checkpoint))
    }

    /// Persist the checkpoint. Written to a sibling temp file first so a
    /// crash mid-write never corrupts an existing checkpoint.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Remove the checkpoint file after a completed run.
    pub fn remove(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medkg_domain::{AssociationGraph, DrugDiseaseAssoc};

    #[test]
    fn test_checkpoint_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally_checkpoint.json");

        let graph = AssociationGraph::build(
            ["Rx1"],
            ["D1"],
            &[DrugDiseaseAssoc::new("Rx1", "D1")],
            &[],
        );
        let cohort: Vec<PatientId> = (0..10).map(PatientId::new).collect();
        let mut checkpoint = TallyCheckpoint::new(cohort.clone());
        checkpoint.tally.absorb(&graph);
        checkpoint.absorbed.insert(PatientId::new(7));

        checkpoint.save(&path).unwrap();
        let restored = TallyCheckpoint::load(&path).unwrap().unwrap();

        assert_eq!(restored.tally, checkpoint.tally);
        assert_eq!(restored.absorbed, checkpoint.absorbed);
        assert!(restored.matches_cohort(&cohort));
        assert!(!restored.matches_cohort(&cohort[..5]));

        TallyCheckpoint::remove(&path).unwrap();
        assert!(TallyCheckpoint::load(&path).unwrap().is_none());
    }
}
