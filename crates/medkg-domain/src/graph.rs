//! The per-patient association graph: nodes, edges and construction.

use crate::error::GraphError;
use crate::literature::{DiseaseDiseaseAssoc, DrugDiseaseAssoc};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a graph node.
///
/// Codes are disjoint across the two namespaces in the source domain, so the
/// category is invariant per code across patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// A drug code node.
    Drug,

    /// A diagnosis code node.
    Diagnosis,
}

impl NodeCategory {
    /// Stable lowercase name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Drug => "drug",
            NodeCategory::Diagnosis => "diagnosis",
        }
    }
}

/// Classification of an edge.
///
/// Every edge starts as `Literature`; temporal validation promotes edges
/// corroborated by the patient's own timeline to `Found`. This is domain
/// state, not styling - any display color derives from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    /// Known from literature only.
    Literature,

    /// Corroborated by the patient's temporal record.
    Found,
}

impl EdgeClass {
    /// Stable lowercase name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeClass::Literature => "literature",
            EdgeClass::Found => "found",
        }
    }
}

/// Kind of association an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Drug–diagnosis association.
    DrugDiagnosis,

    /// Diagnosis–diagnosis association.
    DiagnosisDiagnosis,
}

impl EdgeKind {
    /// Stable lowercase name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::DrugDiagnosis => "drug_diagnosis",
            EdgeKind::DiagnosisDiagnosis => "diagnosis_diagnosis",
        }
    }
}

/// Canonical unordered pair of node codes.
///
/// The two codes are sorted lexicographically on construction, so
/// `PairKey::new("b", "a") == PairKey::new("a", "b")`. This is what makes
/// cohort tallies collapse (a,b) and (b,a) contributions from different
/// patients onto the same entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Build the canonical key for an unordered pair of codes.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Lexicographically smaller code.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically larger code.
    pub fn second(&self) -> &str {
        &self.second
    }
}

// Rendered "first_second"; codes in the source domain (RxNorm ids, ICD
// codes) never contain underscores.
impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.first, self.second)
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairKeyVisitor;

        impl Visitor<'_> for PairKeyVisitor {
            type Value = PairKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a pair key of the form \"code1_code2\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PairKey, E> {
                let (a, b) = v
                    .split_once('_')
                    .ok_or_else(|| E::custom(format!("missing '_' in pair key: {v}")))?;
                Ok(PairKey::new(a, b))
            }
        }

        deserializer.deserialize_str(PairKeyVisitor)
    }
}

/// Attributes of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// What the association connects.
    pub kind: EdgeKind,

    /// Literature-only or corroborated.
    pub class: EdgeClass,
}

/// Undirected association graph for one patient.
///
/// Nodes are drug/diagnosis codes; edges are literature associations
/// restricted to codes the patient actually has. Ordered maps keep iteration
/// deterministic. Mutation after construction is limited to the validation
/// pass promoting edge classifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationGraph {
    nodes: BTreeMap<String, NodeCategory>,
    edges: BTreeMap<PairKey, Edge>,
    validated: bool,
}

impl AssociationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patient's graph from deduplicated codes and the narrowed
    /// literature tables.
    ///
    /// Association rows referencing codes outside the patient's record are
    /// silently dropped (they cannot be grounded), as are disease–disease
    /// self-pairs. Duplicate rows for the same unordered pair collapse to one
    /// edge.
    pub fn build<'a>(
        drug_codes: impl IntoIterator<Item = &'a str>,
        diagnosis_codes: impl IntoIterator<Item = &'a str>,
        drug_disease: &[DrugDiseaseAssoc],
        disease_disease: &[DiseaseDiseaseAssoc],
    ) -> Self {
        let mut graph = Self::new();

        for code in drug_codes {
            graph.add_node(code, NodeCategory::Drug);
        }
        for code in diagnosis_codes {
            graph.add_node(code, NodeCategory::Diagnosis);
        }

        for assoc in drug_disease {
            graph.try_add_edge(
                &assoc.drug_code,
                &assoc.diagnosis_code,
                EdgeKind::DrugDiagnosis,
            );
        }
        for assoc in disease_disease {
            graph.try_add_edge(
                &assoc.diagnosis_a,
                &assoc.diagnosis_b,
                EdgeKind::DiagnosisDiagnosis,
            );
        }

        graph
    }

    /// Add a node. Re-adding an existing code keeps the first category.
    pub fn add_node(&mut self, code: &str, category: NodeCategory) {
        self.nodes.entry(code.to_string()).or_insert(category);
    }

    /// Add a literature edge between two existing nodes.
    ///
    /// Returns `false` without modifying the graph when either endpoint is
    /// absent or the endpoints are the same code.
    pub fn try_add_edge(&mut self, a: &str, b: &str, kind: EdgeKind) -> bool {
        if a == b || !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
            return false;
        }
        self.edges.insert(
            PairKey::new(a, b),
            Edge {
                kind,
                class: EdgeClass::Literature,
            },
        );
        true
    }

    /// Whether the graph contains a node for `code`.
    pub fn contains_node(&self, code: &str) -> bool {
        self.nodes.contains_key(code)
    }

    /// Category of a node, if present.
    pub fn node_category(&self, code: &str) -> Option<NodeCategory> {
        self.nodes.get(code).copied()
    }

    /// Edge attributes for an unordered pair, if present.
    pub fn edge(&self, key: &PairKey) -> Option<Edge> {
        self.edges.get(key).copied()
    }

    /// Iterate nodes in code order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, NodeCategory)> {
        self.nodes.iter().map(|(code, cat)| (code.as_str(), *cat))
    }

    /// Iterate edges in canonical key order.
    pub fn edges(&self) -> impl Iterator<Item = (&PairKey, Edge)> {
        self.edges.iter().map(|(key, edge)| (key, *edge))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges classified [`EdgeClass::Found`].
    pub fn found_edge_count(&self) -> usize {
        self.edges
            .values()
            .filter(|e| e.class == EdgeClass::Found)
            .count()
    }

    /// Degree of a node (number of incident edges).
    pub fn degree(&self, code: &str) -> usize {
        self.edges
            .keys()
            .filter(|k| k.first() == code || k.second() == code)
            .count()
    }

    /// Promote an edge's classification. Returns an error if the edge does
    /// not exist.
    pub(crate) fn set_edge_class(
        &mut self,
        key: &PairKey,
        class: EdgeClass,
    ) -> Result<(), GraphError> {
        match self.edges.get_mut(key) {
            Some(edge) => {
                edge.class = class;
                Ok(())
            }
            None => Err(GraphError::InvalidState(format!(
                "no edge for pair {key}"
            ))),
        }
    }

    /// Whether temporal validation has run on this graph.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Record that temporal validation has run.
    pub(crate) fn mark_validated(&mut self) {
        self.validated = true;
    }

    /// Remove a node and every edge incident to it.
    pub(crate) fn remove_node(&mut self, code: &str) {
        self.nodes.remove(code);
        self.edges
            .retain(|k, _| k.first() != code && k.second() != code);
    }

    /// Remove an edge, keeping its endpoints.
    pub(crate) fn remove_edge(&mut self, key: &PairKey) {
        self.edges.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_canonical() {
        assert_eq!(PairKey::new("b", "a"), PairKey::new("a", "b"));
        assert_eq!(PairKey::new("b", "a").to_string(), "a_b");
    }

    #[test]
    fn test_edge_requires_both_nodes() {
        let mut graph = AssociationGraph::new();
        graph.add_node("100", NodeCategory::Drug);

        assert!(!graph.try_add_edge("100", "250.0", EdgeKind::DrugDiagnosis));
        assert_eq!(graph.edge_count(), 0);

        graph.add_node("250.0", NodeCategory::Diagnosis);
        assert!(graph.try_add_edge("100", "250.0", EdgeKind::DrugDiagnosis));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_no_self_loops() {
        let mut graph = AssociationGraph::new();
        graph.add_node("250.0", NodeCategory::Diagnosis);

        assert!(!graph.try_add_edge("250.0", "250.0", EdgeKind::DiagnosisDiagnosis));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let mut graph = AssociationGraph::new();
        graph.add_node("250.0", NodeCategory::Diagnosis);
        graph.add_node("401.9", NodeCategory::Diagnosis);

        assert!(graph.try_add_edge("250.0", "401.9", EdgeKind::DiagnosisDiagnosis));
        assert!(graph.try_add_edge("401.9", "250.0", EdgeKind::DiagnosisDiagnosis));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_build_drops_ungrounded_associations() {
        let graph = AssociationGraph::build(
            ["100"],
            ["250.0"],
            &[
                DrugDiseaseAssoc::new("100", "250.0"),
                // 999 is not a patient code
                DrugDiseaseAssoc::new("999", "250.0"),
            ],
            &[
                // 401.9 is not a patient code
                DiseaseDiseaseAssoc::new("250.0", "401.9"),
                // self-pair
                DiseaseDiseaseAssoc::new("250.0", "250.0"),
            ],
        );

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge(&PairKey::new("100", "250.0")).unwrap();
        assert_eq!(edge.kind, EdgeKind::DrugDiagnosis);
        assert_eq!(edge.class, EdgeClass::Literature);
    }

    #[test]
    fn test_degree() {
        let graph = AssociationGraph::build(
            ["100"],
            ["250.0", "401.9"],
            &[DrugDiseaseAssoc::new("100", "250.0")],
            &[DiseaseDiseaseAssoc::new("250.0", "401.9")],
        );

        assert_eq!(graph.degree("250.0"), 2);
        assert_eq!(graph.degree("100"), 1);
        assert_eq!(graph.degree("absent"), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn code() -> impl Strategy<Value = String> {
        "[0-9]{1,4}(\\.[0-9]{1,2})?"
    }

    proptest! {
        /// Property: PairKey construction is symmetric in its arguments.
        #[test]
        fn test_pair_key_symmetry(a in code(), b in code()) {
            prop_assert_eq!(PairKey::new(a.clone(), b.clone()), PairKey::new(b, a));
        }

        /// Property: every edge of a built graph connects two present nodes
        /// and is never a self-loop.
        #[test]
        fn test_built_graph_invariants(
            drugs in prop::collection::btree_set(code(), 0..6),
            diags in prop::collection::btree_set(code(), 0..6),
            pair_picks in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..12),
        ) {
            let drug_vec: Vec<String> = drugs.iter().cloned().collect();
            let diag_vec: Vec<String> = diags.iter().cloned().collect();

            // Random association rows over (and slightly beyond) the code pool
            let mut mdas = Vec::new();
            let mut ddas = Vec::new();
            for (i, j) in pair_picks {
                if !drug_vec.is_empty() && !diag_vec.is_empty() {
                    mdas.push(DrugDiseaseAssoc::new(
                        i.get(&drug_vec).clone(),
                        j.get(&diag_vec).clone(),
                    ));
                }
                if diag_vec.len() >= 2 {
                    ddas.push(DiseaseDiseaseAssoc::new(
                        i.get(&diag_vec).clone(),
                        j.get(&diag_vec).clone(),
                    ));
                }
            }
            mdas.push(DrugDiseaseAssoc::new("no-such-drug", "no-such-diag"));

            let graph = AssociationGraph::build(
                drug_vec.iter().map(String::as_str),
                diag_vec.iter().map(String::as_str),
                &mdas,
                &ddas,
            );

            prop_assert!(graph.node_count() <= drugs.len() + diags.len());
            for (key, _) in graph.edges() {
                prop_assert!(graph.contains_node(key.first()));
                prop_assert!(graph.contains_node(key.second()));
                prop_assert_ne!(key.first(), key.second());
            }
        }
    }
}
