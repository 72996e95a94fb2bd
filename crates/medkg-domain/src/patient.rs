//! Patient records - dated drug and diagnosis events for one patient.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for a patient in the source population.
///
/// The source domain keys patients by a 64-bit integer; the newtype keeps
/// patient ids from being confused with counts or other integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PatientId(i64);

impl PatientId {
    /// Wrap a raw patient id.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw id value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One prescription event: a drug code and the date it was prescribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugEvent {
    /// Drug code (RxNorm concept id in the source domain).
    pub code: String,

    /// Prescription date.
    pub date: NaiveDate,
}

impl DrugEvent {
    /// Create a new drug event.
    pub fn new(code: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            code: code.into(),
            date,
        }
    }
}

/// One diagnosis event: a diagnosis code and the visit date it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisEvent {
    /// Diagnosis code (ICD code in the source domain).
    pub code: String,

    /// Visit date.
    pub date: NaiveDate,
}

impl DiagnosisEvent {
    /// Create a new diagnosis event.
    pub fn new(code: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            code: code.into(),
            date,
        }
    }
}

/// One patient's full record: id plus ordered drug and diagnosis events.
///
/// Events are ordered by date as delivered by the data source; the same code
/// may appear many times (repeat prescriptions, repeat visits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    /// Patient identifier.
    pub id: PatientId,

    /// Prescription events, ordered by date.
    pub drug_events: Vec<DrugEvent>,

    /// Diagnosis events, ordered by date.
    pub diagnosis_events: Vec<DiagnosisEvent>,
}

impl PatientRecord {
    /// Create a record from already-fetched event lists.
    pub fn new(
        id: PatientId,
        drug_events: Vec<DrugEvent>,
        diagnosis_events: Vec<DiagnosisEvent>,
    ) -> Self {
        Self {
            id,
            drug_events,
            diagnosis_events,
        }
    }

    /// Deduplicated drug codes in this record.
    pub fn drug_codes(&self) -> BTreeSet<&str> {
        self.drug_events.iter().map(|e| e.code.as_str()).collect()
    }

    /// Deduplicated diagnosis codes in this record.
    pub fn diagnosis_codes(&self) -> BTreeSet<&str> {
        self.diagnosis_events
            .iter()
            .map(|e| e.code.as_str())
            .collect()
    }
}
