//! Temporal validation - corroborating literature edges against the
//! patient's own dated record.

use crate::error::GraphError;
use crate::filter::RelevantRecords;
use crate::graph::{AssociationGraph, EdgeClass, EdgeKind, NodeCategory, PairKey};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Per-code date lists for one patient, the validator's view of the
/// patient's timeline.
#[derive(Debug, Clone, Default)]
pub struct EventDates {
    drug: BTreeMap<String, Vec<NaiveDate>>,
    diagnosis: BTreeMap<String, Vec<NaiveDate>>,
}

impl EventDates {
    /// Index the narrowed patient events by code.
    pub fn from_records(records: &RelevantRecords) -> Self {
        let mut drug: BTreeMap<String, Vec<NaiveDate>> = BTreeMap::new();
        for event in &records.drug_events {
            drug.entry(event.code.clone()).or_default().push(event.date);
        }

        let mut diagnosis: BTreeMap<String, Vec<NaiveDate>> = BTreeMap::new();
        for event in &records.diagnosis_events {
            diagnosis
                .entry(event.code.clone())
                .or_default()
                .push(event.date);
        }

        Self { drug, diagnosis }
    }

    /// Prescription dates for a drug code (empty slice if none).
    pub fn drug_dates(&self, code: &str) -> &[NaiveDate] {
        self.drug.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visit dates for a diagnosis code (empty slice if none).
    pub fn diagnosis_dates(&self, code: &str) -> &[NaiveDate] {
        self.diagnosis.get(code).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Node codes and edge pairs confirmed by temporal overlap.
///
/// An edge is classified [`EdgeClass::Found`] iff its pair is in the
/// corresponding found-pairs set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoundSets {
    /// Drug codes with at least one corroborated edge.
    pub drugs: BTreeSet<String>,

    /// Diagnosis codes with at least one corroborated edge.
    pub diagnoses: BTreeSet<String>,

    /// Corroborated drug–diagnosis pairs (canonical keys).
    pub drug_diagnosis_pairs: BTreeSet<PairKey>,

    /// Corroborated diagnosis–diagnosis pairs (canonical keys).
    pub diagnosis_diagnosis_pairs: BTreeSet<PairKey>,
}

impl FoundSets {
    /// Union of both found-pair sets.
    pub fn edges(&self) -> BTreeSet<PairKey> {
        self.drug_diagnosis_pairs
            .union(&self.diagnosis_diagnosis_pairs)
            .cloned()
            .collect()
    }

    /// Union of found drug and diagnosis codes.
    pub fn nodes(&self) -> BTreeSet<String> {
        self.drugs.union(&self.diagnoses).cloned().collect()
    }
}

/// Walks literature edges and promotes those the patient's timeline
/// corroborates within a date window.
///
/// Two-phase protocol: build the graph first, then validate it in place.
/// Validation is idempotent - running it twice yields the same
/// classification as running it once.
#[derive(Debug, Clone, Copy)]
pub struct TemporalValidator {
    window_days: u64,
}

/// Default corroboration window in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 90;

impl TemporalValidator {
    /// Create a validator with a window of `window_days` days.
    ///
    /// Negative windows are rejected with [`GraphError::InvalidArgument`].
    pub fn new(window_days: i64) -> Result<Self, GraphError> {
        if window_days < 0 {
            return Err(GraphError::InvalidArgument(format!(
                "time window must be non-negative, got {window_days}"
            )));
        }
        Ok(Self {
            window_days: window_days as u64,
        })
    }

    /// The configured window length in days.
    pub fn window_days(&self) -> u64 {
        self.window_days
    }

    /// Run both validation passes, mutating edge classifications in place
    /// and marking the graph validated.
    ///
    /// Returns the found-sets. Any single overlapping date pair suffices to
    /// corroborate an edge; the scan stops at the first hit per edge.
    pub fn validate(&self, graph: &mut AssociationGraph, dates: &EventDates) -> FoundSets {
        let mut found = FoundSets::default();

        let edges: Vec<(PairKey, EdgeKind)> =
            graph.edges().map(|(key, edge)| (key.clone(), edge.kind)).collect();

        for (key, kind) in edges {
            match kind {
                EdgeKind::DrugDiagnosis => {
                    self.check_drug_diagnosis(graph, dates, &key, &mut found)
                }
                EdgeKind::DiagnosisDiagnosis => {
                    self.check_diagnosis_diagnosis(graph, dates, &key, &mut found)
                }
            }
        }

        graph.mark_validated();
        found
    }

    /// Corroborate a drug–diagnosis edge: some visit date `d` of the
    /// diagnosis followed by a prescription `p` with `d <= p <= d + window`.
    fn check_drug_diagnosis(
        &self,
        graph: &mut AssociationGraph,
        dates: &EventDates,
        key: &PairKey,
        found: &mut FoundSets,
    ) {
        // Which endpoint is the drug is a node-category question, not an
        // ordering convention of the pair key.
        let (drug, diag) = match graph.node_category(key.first()) {
            Some(NodeCategory::Drug) => (key.first(), key.second()),
            _ => (key.second(), key.first()),
        };

        if self.windows_overlap(dates.diagnosis_dates(diag), dates.drug_dates(drug)) {
            // The edge exists by construction, so the promotion cannot fail.
            let _ = graph.set_edge_class(key, EdgeClass::Found);
            found.drugs.insert(drug.to_string());
            found.diagnoses.insert(diag.to_string());
            found.drug_diagnosis_pairs.insert(key.clone());
        }
    }

    /// Corroborate a diagnosis–diagnosis edge, trying both codes as the
    /// anchor. The found pair is recorded in canonical sorted form either
    /// way, so (a,b) and (b,a) matches collapse to one entry.
    fn check_diagnosis_diagnosis(
        &self,
        graph: &mut AssociationGraph,
        dates: &EventDates,
        key: &PairKey,
        found: &mut FoundSets,
    ) {
        let a = dates.diagnosis_dates(key.first());
        let b = dates.diagnosis_dates(key.second());

        if self.windows_overlap(a, b) || self.windows_overlap(b, a) {
            let _ = graph.set_edge_class(key, EdgeClass::Found);
            found.diagnoses.insert(key.first().to_string());
            found.diagnoses.insert(key.second().to_string());
            found.diagnosis_diagnosis_pairs.insert(key.clone());
        }
    }

    /// Whether any `other` date falls in `[anchor, anchor + window]` for any
    /// anchor date. Both bounds inclusive; empty inputs never match.
    fn windows_overlap(&self, anchors: &[NaiveDate], others: &[NaiveDate]) -> bool {
        anchors.iter().any(|&anchor| {
            let end = anchor
                .checked_add_days(Days::new(self.window_days))
                .unwrap_or(NaiveDate::MAX);
            others.iter().any(|&o| anchor <= o && o <= end)
        })
    }
}
