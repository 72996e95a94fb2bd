//! Narrowing literature tables to the parts relevant to one patient.

use crate::literature::{DiseaseDiseaseAssoc, DrugDiseaseAssoc, Literature};
use crate::patient::{DiagnosisEvent, DrugEvent, PatientRecord};
use std::collections::BTreeSet;

/// One patient's events and literature rows, narrowed to codes the patient
/// actually has.
///
/// Output of [`Literature::narrow_to`]; input to graph construction and
/// temporal validation. Pure data, no behavior beyond accessors.
#[derive(Debug, Clone, Default)]
pub struct RelevantRecords {
    /// Drug events whose code appears in the drug–disease literature.
    pub drug_events: Vec<DrugEvent>,

    /// Diagnosis events whose code appears in the drug–disease literature or
    /// in the disease–disease code universe.
    pub diagnosis_events: Vec<DiagnosisEvent>,

    /// Drug–disease rows with both codes inside the narrowed patient sets.
    pub drug_disease: Vec<DrugDiseaseAssoc>,

    /// Disease–disease rows with both codes inside the narrowed diagnosis set.
    pub disease_disease: Vec<DiseaseDiseaseAssoc>,
}

impl RelevantRecords {
    /// Deduplicated drug codes among the relevant events.
    pub fn drug_codes(&self) -> BTreeSet<&str> {
        self.drug_events.iter().map(|e| e.code.as_str()).collect()
    }

    /// Deduplicated diagnosis codes among the relevant events.
    pub fn diagnosis_codes(&self) -> BTreeSet<&str> {
        self.diagnosis_events
            .iter()
            .map(|e| e.code.as_str())
            .collect()
    }
}

impl Literature {
    /// Narrow these literature tables to one patient's record.
    ///
    /// Keeps drug events whose code the drug–disease table knows, diagnosis
    /// events whose code either literature table knows, then filters both
    /// association tables down to rows fully contained in those narrowed
    /// code sets. Empty inputs yield empty outputs.
    pub fn narrow_to(&self, patient: &PatientRecord) -> RelevantRecords {
        let lit_drug_codes = self.drug_codes();
        let lit_dd_diag_codes = self.drug_disease_diagnosis_codes();
        let lit_disease_codes = self.disease_disease_codes();

        let drug_events: Vec<DrugEvent> = patient
            .drug_events
            .iter()
            .filter(|e| lit_drug_codes.contains(e.code.as_str()))
            .cloned()
            .collect();

        let diagnosis_events: Vec<DiagnosisEvent> = patient
            .diagnosis_events
            .iter()
            .filter(|e| {
                lit_dd_diag_codes.contains(e.code.as_str())
                    || lit_disease_codes.contains(e.code.as_str())
            })
            .cloned()
            .collect();

        let patient_drugs: BTreeSet<&str> =
            drug_events.iter().map(|e| e.code.as_str()).collect();
        let patient_diags: BTreeSet<&str> =
            diagnosis_events.iter().map(|e| e.code.as_str()).collect();

        let drug_disease: Vec<DrugDiseaseAssoc> = self
            .drug_disease
            .iter()
            .filter(|a| {
                patient_drugs.contains(a.drug_code.as_str())
                    && patient_diags.contains(a.diagnosis_code.as_str())
            })
            .cloned()
            .collect();

        let disease_disease: Vec<DiseaseDiseaseAssoc> = self
            .disease_disease
            .iter()
            .filter(|a| {
                patient_diags.contains(a.diagnosis_a.as_str())
                    && patient_diags.contains(a.diagnosis_b.as_str())
            })
            .cloned()
            .collect();

        RelevantRecords {
            drug_events,
            diagnosis_events,
            drug_disease,
            disease_disease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::PatientId;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_literature() -> Literature {
        Literature::new(
            vec![
                DrugDiseaseAssoc::new("100", "250.0"),
                DrugDiseaseAssoc::new("300", "401.9"),
            ],
            vec![
                DiseaseDiseaseAssoc::new("250.0", "401.9"),
                DiseaseDiseaseAssoc::new("401.9", "585.9"),
            ],
        )
    }

    #[test]
    fn test_narrow_keeps_only_patient_codes() {
        let patient = PatientRecord::new(
            PatientId::new(1),
            vec![
                DrugEvent::new("100", date("2020-01-10")),
                // Not in any literature table, dropped
                DrugEvent::new("999", date("2020-01-11")),
            ],
            vec![
                DiagnosisEvent::new("250.0", date("2020-01-01")),
                DiagnosisEvent::new("401.9", date("2020-01-02")),
                DiagnosisEvent::new("V99", date("2020-01-03")),
            ],
        );

        let relevant = sample_literature().narrow_to(&patient);

        assert_eq!(relevant.drug_codes(), ["100"].into_iter().collect());
        assert_eq!(
            relevant.diagnosis_codes(),
            ["250.0", "401.9"].into_iter().collect()
        );
        // Drug 300 is not the patient's, so its association row is filtered
        assert_eq!(relevant.drug_disease.len(), 1);
        assert_eq!(relevant.drug_disease[0].drug_code, "100");
        // 585.9 is not the patient's, so the second pair is filtered
        assert_eq!(relevant.disease_disease.len(), 1);
    }

    #[test]
    fn test_disease_universe_broadens_diagnosis_filter() {
        // 585.9 appears only in the disease–disease table; a patient with it
        // still gets the diagnosis event kept.
        let patient = PatientRecord::new(
            PatientId::new(2),
            vec![],
            vec![DiagnosisEvent::new("585.9", date("2020-05-05"))],
        );

        let relevant = sample_literature().narrow_to(&patient);
        assert_eq!(relevant.diagnosis_codes(), ["585.9"].into_iter().collect());
        // Its partner 401.9 is absent, so no association row survives
        assert!(relevant.disease_disease.is_empty());
    }

    #[test]
    fn test_empty_inputs_yield_empty_outputs() {
        let patient = PatientRecord::new(PatientId::new(3), vec![], vec![]);
        let relevant = Literature::default().narrow_to(&patient);

        assert!(relevant.drug_events.is_empty());
        assert!(relevant.diagnosis_events.is_empty());
        assert!(relevant.drug_disease.is_empty());
        assert!(relevant.disease_disease.is_empty());
    }
}
