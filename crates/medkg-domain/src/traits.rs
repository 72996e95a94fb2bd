//! Trait definitions for external collaborators.
//!
//! The domain layer never assumes a particular query mechanism; the
//! relational source behind these traits lives in the infrastructure layer
//! (medkg-store).

use crate::literature::{DiseaseDiseaseAssoc, DrugDiseaseAssoc};
use crate::patient::{DiagnosisEvent, DrugEvent, PatientId};

/// Read access to the patient population and the literature tables.
///
/// Implemented by the infrastructure layer. Query failures are the
/// implementor's error type; callers propagate them, never retry.
pub trait DataSource {
    /// Error type for query operations.
    type Error;

    /// Ordered prescription events for one patient.
    fn drug_events(&self, patient: PatientId) -> Result<Vec<DrugEvent>, Self::Error>;

    /// Ordered diagnosis events for one patient.
    fn diagnosis_events(&self, patient: PatientId) -> Result<Vec<DiagnosisEvent>, Self::Error>;

    /// The full literature drug–disease table.
    fn drug_disease_associations(&self) -> Result<Vec<DrugDiseaseAssoc>, Self::Error>;

    /// The full literature disease–disease table.
    fn disease_disease_associations(&self) -> Result<Vec<DiseaseDiseaseAssoc>, Self::Error>;

    /// Diagnosis codes mapped to a phenotype code.
    fn phenotype_diagnoses(&self, phenotype_code: &str) -> Result<Vec<String>, Self::Error>;

    /// Distinct patients having a diagnosis code (cohort seed).
    fn patients_with_diagnosis(&self, diagnosis_code: &str)
        -> Result<Vec<PatientId>, Self::Error>;

    /// Human-readable label for a node code, trying drug name, diagnosis
    /// name, then external disease name. `None` when no label is known;
    /// callers fall back to the code itself.
    fn node_label(&self, code: &str) -> Result<Option<String>, Self::Error>;
}
