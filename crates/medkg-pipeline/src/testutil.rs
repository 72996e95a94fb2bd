//! Shared in-memory `DataSource` for pipeline tests.

use medkg_domain::traits::DataSource;
use medkg_domain::{
    DiagnosisEvent, DiseaseDiseaseAssoc, DrugDiseaseAssoc, DrugEvent, PatientId,
};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory data source. Ids listed in `failing` make every patient query
/// error, exercising failure isolation.
#[derive(Default)]
pub struct MockSource {
    pub drugs: BTreeMap<PatientId, Vec<DrugEvent>>,
    pub diagnoses: BTreeMap<PatientId, Vec<DiagnosisEvent>>,
    pub drug_disease: Vec<(String, String)>,
    pub disease_disease: Vec<(String, String)>,
    pub phenotypes: BTreeMap<String, Vec<String>>,
    pub labels: BTreeMap<String, String>,
    pub failing: BTreeSet<PatientId>,
}

impl MockSource {
    fn check(&self, patient: PatientId) -> Result<(), String> {
        if self.failing.contains(&patient) {
            Err(format!("query failed for patient {patient}"))
        } else {
            Ok(())
        }
    }
}

impl DataSource for MockSource {
    type Error = String;

    fn drug_events(&self, patient: PatientId) -> Result<Vec<DrugEvent>, Self::Error> {
        self.check(patient)?;
        Ok(self.drugs.get(&patient).cloned().unwrap_or_default())
    }

    fn diagnosis_events(&self, patient: PatientId) -> Result<Vec<DiagnosisEvent>, Self::Error> {
        self.check(patient)?;
        Ok(self.diagnoses.get(&patient).cloned().unwrap_or_default())
    }

    fn drug_disease_associations(&self) -> Result<Vec<DrugDiseaseAssoc>, Self::Error> {
        Ok(self
            .drug_disease
            .iter()
            .map(|(drug, diag)| DrugDiseaseAssoc::new(drug, diag))
            .collect())
    }

    fn disease_disease_associations(&self) -> Result<Vec<DiseaseDiseaseAssoc>, Self::Error> {
        Ok(self
            .disease_disease
            .iter()
            .map(|(a, b)| DiseaseDiseaseAssoc::new(a, b))
            .collect())
    }

    fn phenotype_diagnoses(&self, phenotype_code: &str) -> Result<Vec<String>, Self::Error> {
        Ok(self.phenotypes.get(phenotype_code).cloned().unwrap_or_default())
    }

    fn patients_with_diagnosis(
        &self,
        diagnosis_code: &str,
    ) -> Result<Vec<PatientId>, Self::Error> {
        Ok(self
            .diagnoses
            .iter()
            .filter(|(_, events)| events.iter().any(|e| e.code == diagnosis_code))
            .map(|(id, _)| *id)
            .collect())
    }

    fn node_label(&self, code: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.labels.get(code).cloned())
    }
}
