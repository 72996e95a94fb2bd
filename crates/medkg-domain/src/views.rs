//! Read-only projections of a validated graph.

use crate::error::GraphError;
use crate::graph::{AssociationGraph, EdgeClass, PairKey};
use crate::validate::FoundSets;

/// The three derived projections of a patient graph.
///
/// Used by export collaborators to pick which subgraph(s) to write. None of
/// them mutates the source graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphView {
    /// The graph unchanged.
    Complete,

    /// The graph minus isolated (degree-0) nodes.
    ConnectedOnly,

    /// Induced subgraph on the found nodes with only `Found` edges kept.
    FoundOnly,
}

impl GraphView {
    /// Stable lowercase name used in export file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphView::Complete => "complete",
            GraphView::ConnectedOnly => "without-isolates",
            GraphView::FoundOnly => "only-found",
        }
    }

    /// Apply this view to a graph.
    pub fn apply(
        &self,
        graph: &AssociationGraph,
        found: &FoundSets,
    ) -> Result<AssociationGraph, GraphError> {
        match self {
            GraphView::Complete => Ok(graph.complete()),
            GraphView::ConnectedOnly => Ok(graph.without_isolates()),
            GraphView::FoundOnly => graph.found_only(found),
        }
    }
}

impl AssociationGraph {
    /// The complete view: an unchanged copy of the graph.
    pub fn complete(&self) -> AssociationGraph {
        self.clone()
    }

    /// A copy of the graph with all isolated (degree-0) nodes removed.
    pub fn without_isolates(&self) -> AssociationGraph {
        let isolated: Vec<String> = self
            .nodes()
            .filter(|(code, _)| self.degree(code) == 0)
            .map(|(code, _)| code.to_string())
            .collect();

        let mut view = self.clone();
        for code in &isolated {
            view.remove_node(code);
        }
        view
    }

    /// The induced subgraph on the found node set, with every
    /// `Literature`-classified edge additionally removed.
    ///
    /// # Errors
    ///
    /// `InvalidState` when temporal validation has not run on this graph.
    pub fn found_only(&self, found: &FoundSets) -> Result<AssociationGraph, GraphError> {
        if !self.is_validated() {
            return Err(GraphError::InvalidState(
                "found-only view requires temporal validation to have run".to_string(),
            ));
        }

        let found_nodes = found.nodes();
        let mut view = self.clone();

        let absent: Vec<String> = view
            .nodes()
            .filter(|(code, _)| !found_nodes.contains(*code))
            .map(|(code, _)| code.to_string())
            .collect();
        for code in &absent {
            view.remove_node(code);
        }

        // Literature edges between two found nodes do not survive either.
        let literature: Vec<PairKey> = view
            .edges()
            .filter(|(_, edge)| edge.class == EdgeClass::Literature)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &literature {
            view.remove_edge(key);
        }

        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RelevantRecords;
    use crate::literature::{DiseaseDiseaseAssoc, DrugDiseaseAssoc};
    use crate::patient::{DiagnosisEvent, DrugEvent};
    use crate::validate::{EventDates, TemporalValidator};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Rx1-D1 corroborated, D1-D2 not (D2 visit outside window), Rx9
    /// isolated (its association row references a foreign diagnosis).
    fn validated_fixture() -> (AssociationGraph, FoundSets) {
        let records = RelevantRecords {
            drug_events: vec![
                DrugEvent::new("Rx1", date("2020-02-01")),
                DrugEvent::new("Rx9", date("2020-02-01")),
            ],
            diagnosis_events: vec![
                DiagnosisEvent::new("D1", date("2020-01-01")),
                DiagnosisEvent::new("D2", date("2021-01-01")),
            ],
            drug_disease: vec![
                DrugDiseaseAssoc::new("Rx1", "D1"),
                DrugDiseaseAssoc::new("Rx9", "D-foreign"),
            ],
            disease_disease: vec![DiseaseDiseaseAssoc::new("D1", "D2")],
        };
        let mut graph = AssociationGraph::build(
            records.drug_codes(),
            records.diagnosis_codes(),
            &records.drug_disease,
            &records.disease_disease,
        );
        let dates = EventDates::from_records(&records);
        let found = TemporalValidator::new(90).unwrap().validate(&mut graph, &dates);
        (graph, found)
    }

    #[test]
    fn test_complete_view_is_unchanged() {
        let (graph, _) = validated_fixture();
        assert_eq!(graph.complete(), graph);
    }

    #[test]
    fn test_without_isolates_drops_degree_zero_nodes() {
        let (graph, _) = validated_fixture();
        let view = graph.without_isolates();

        assert!(graph.contains_node("Rx9"));
        assert!(!view.contains_node("Rx9"));
        assert_eq!(view.edge_count(), graph.edge_count());
        // Source untouched
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_found_only_keeps_found_edges_and_nodes() {
        let (graph, found) = validated_fixture();
        let view = graph.found_only(&found).unwrap();

        assert!(view.contains_node("Rx1"));
        assert!(view.contains_node("D1"));
        assert!(!view.contains_node("D2"));
        assert!(!view.contains_node("Rx9"));
        assert_eq!(view.edge_count(), 1);
        assert_eq!(
            view.edge(&PairKey::new("Rx1", "D1")).unwrap().class,
            EdgeClass::Found
        );
    }

    #[test]
    fn test_found_only_removes_literature_edges_between_found_nodes() {
        // D1 and D3 both become found via drugs, but their mutual
        // diagnosis–diagnosis edge stays literature and must not survive.
        let records = RelevantRecords {
            drug_events: vec![
                DrugEvent::new("Rx1", date("2020-01-05")),
                DrugEvent::new("Rx2", date("2020-06-05")),
            ],
            diagnosis_events: vec![
                DiagnosisEvent::new("D1", date("2020-01-01")),
                DiagnosisEvent::new("D3", date("2020-06-01")),
            ],
            drug_disease: vec![
                DrugDiseaseAssoc::new("Rx1", "D1"),
                DrugDiseaseAssoc::new("Rx2", "D3"),
            ],
            disease_disease: vec![DiseaseDiseaseAssoc::new("D1", "D3")],
        };
        let mut graph = AssociationGraph::build(
            records.drug_codes(),
            records.diagnosis_codes(),
            &records.drug_disease,
            &records.disease_disease,
        );
        let dates = EventDates::from_records(&records);
        let found = TemporalValidator::new(30).unwrap().validate(&mut graph, &dates);

        // D1-D3 visits are months apart, not corroborated
        assert_eq!(
            graph.edge(&PairKey::new("D1", "D3")).unwrap().class,
            EdgeClass::Literature
        );

        let view = graph.found_only(&found).unwrap();
        assert!(view.contains_node("D1"));
        assert!(view.contains_node("D3"));
        assert!(view.edge(&PairKey::new("D1", "D3")).is_none());
        assert_eq!(view.edge_count(), 2);
    }

    #[test]
    fn test_found_only_requires_validation() {
        let graph = AssociationGraph::build(
            ["Rx1"],
            ["D1"],
            &[DrugDiseaseAssoc::new("Rx1", "D1")],
            &[],
        );

        let err = graph.found_only(&FoundSets::default()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidState(_)));
    }
}
