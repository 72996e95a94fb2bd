//! The per-patient unit of work: fetch, filter, build, validate.

use crate::error::{PipelineError, Result};
use medkg_domain::traits::DataSource;
use medkg_domain::{
    AssociationGraph, EventDates, FoundSets, Literature, PatientId, PatientRecord,
    TemporalValidator,
};

/// One patient's validated graph and its found-sets.
#[derive(Debug, Clone)]
pub struct PatientGraph {
    /// Patient id.
    pub id: PatientId,

    /// The validated association graph.
    pub graph: AssociationGraph,

    /// Node codes and edge pairs corroborated by the patient's timeline.
    pub found: FoundSets,
}

impl PatientGraph {
    /// Statistics row values: (nodes, edges, found edges).
    pub fn stats(&self) -> (usize, usize, usize) {
        (
            self.graph.node_count(),
            self.graph.edge_count(),
            self.found.edges().len(),
        )
    }
}

/// Build and validate one patient's graph.
///
/// Fetches the patient's events from the source and narrows the shared
/// literature tables to them. Every code in the patient's record becomes a
/// node; codes the literature does not know stay as isolated nodes (the
/// without-isolates view is what drops them). Edges come from the narrowed
/// tables only. Any query failure aborts this patient only.
pub fn build_patient_graph<S: DataSource>(
    source: &S,
    literature: &Literature,
    id: PatientId,
    validator: &TemporalValidator,
) -> Result<PatientGraph>
where
    S::Error: std::fmt::Display,
{
    let drug_events = source.drug_events(id).map_err(PipelineError::data_access)?;
    let diagnosis_events = source
        .diagnosis_events(id)
        .map_err(PipelineError::data_access)?;

    let record = PatientRecord::new(id, drug_events, diagnosis_events);
    let relevant = literature.narrow_to(&record);

    let mut graph = AssociationGraph::build(
        record.drug_codes(),
        record.diagnosis_codes(),
        &relevant.drug_disease,
        &relevant.disease_disease,
    );
    let dates = EventDates::from_records(&relevant);
    let found = validator.validate(&mut graph, &dates);

    tracing::debug!(
        patient = %id,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        found_edges = found.edges().len(),
        "patient graph built"
    );

    Ok(PatientGraph { id, graph, found })
}

/// Fetch both literature tables once for a batch run.
pub fn fetch_literature<S: DataSource>(source: &S) -> Result<Literature>
where
    S::Error: std::fmt::Display,
{
    let drug_disease = source
        .drug_disease_associations()
        .map_err(PipelineError::data_access)?;
    let disease_disease = source
        .disease_disease_associations()
        .map_err(PipelineError::data_access)?;
    Ok(Literature::new(drug_disease, disease_disease))
}

/// Resolve a node label, tolerating lookup failure (labels are a rendering
/// bolt-on; the code itself is always an acceptable fallback).
pub fn label_or_none<S: DataSource>(source: &S, code: &str) -> Option<String>
where
    S::Error: std::fmt::Display,
{
    match source.node_label(code) {
        Ok(label) => label,
        Err(e) => {
            tracing::warn!(code, error = %e, "label lookup failed, using code");
            None
        }
    }
}
