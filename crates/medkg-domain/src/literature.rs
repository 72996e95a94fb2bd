//! Literature association tables - drug–disease and disease–disease pairs.

use std::collections::BTreeSet;

/// A literature-derived drug–disease association.
///
/// Symmetric lookup key only; the pair carries no direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugDiseaseAssoc {
    /// Drug code.
    pub drug_code: String,

    /// Diagnosis code.
    pub diagnosis_code: String,
}

impl DrugDiseaseAssoc {
    /// Create a new drug–disease association.
    pub fn new(drug_code: impl Into<String>, diagnosis_code: impl Into<String>) -> Self {
        Self {
            drug_code: drug_code.into(),
            diagnosis_code: diagnosis_code.into(),
        }
    }
}

/// A literature-derived disease–disease association.
///
/// Unordered pair of diagnosis codes. Self-pairs (a == b) may occur in the
/// raw table and are rejected at graph build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseDiseaseAssoc {
    /// First diagnosis code.
    pub diagnosis_a: String,

    /// Second diagnosis code.
    pub diagnosis_b: String,
}

impl DiseaseDiseaseAssoc {
    /// Create a new disease–disease association.
    pub fn new(diagnosis_a: impl Into<String>, diagnosis_b: impl Into<String>) -> Self {
        Self {
            diagnosis_a: diagnosis_a.into(),
            diagnosis_b: diagnosis_b.into(),
        }
    }
}

/// The full literature tables, fetched once per batch run and shared
/// (read-only) across every patient's unit of work.
#[derive(Debug, Clone, Default)]
pub struct Literature {
    /// Drug–disease association table.
    pub drug_disease: Vec<DrugDiseaseAssoc>,

    /// Disease–disease association table.
    pub disease_disease: Vec<DiseaseDiseaseAssoc>,
}

impl Literature {
    /// Create literature tables from fetched rows.
    pub fn new(
        drug_disease: Vec<DrugDiseaseAssoc>,
        disease_disease: Vec<DiseaseDiseaseAssoc>,
    ) -> Self {
        Self {
            drug_disease,
            disease_disease,
        }
    }

    /// All drug codes appearing in the drug–disease table.
    pub fn drug_codes(&self) -> BTreeSet<&str> {
        self.drug_disease
            .iter()
            .map(|a| a.drug_code.as_str())
            .collect()
    }

    /// All diagnosis codes appearing in the drug–disease table.
    pub fn drug_disease_diagnosis_codes(&self) -> BTreeSet<&str> {
        self.drug_disease
            .iter()
            .map(|a| a.diagnosis_code.as_str())
            .collect()
    }

    /// The diagnosis-code universe of the disease–disease table
    /// (codes from either side of any pair).
    pub fn disease_disease_codes(&self) -> BTreeSet<&str> {
        self.disease_disease
            .iter()
            .flat_map(|a| [a.diagnosis_a.as_str(), a.diagnosis_b.as_str()])
            .collect()
    }
}
