//! Cross-patient aggregation - recurrence tallies and the averaged graph.

use crate::error::GraphError;
use crate::graph::{AssociationGraph, EdgeClass, EdgeKind, NodeCategory, PairKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running recurrence data for one edge pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTally {
    /// Number of patient graphs containing this pair.
    pub count: usize,

    /// Association kind, first-seen wins (invariant per pair across
    /// patients by construction).
    pub kind: EdgeKind,

    /// Classification tag, first-seen wins.
    pub class: EdgeClass,
}

/// Recurrence counts folded over many patients' graphs.
///
/// The fold is commutative and associative: absorbing graphs in any order,
/// or merging independently-built tallies, yields the same result. Created
/// empty per aggregation run, grown one step per patient graph, consumed
/// once by [`CohortTally::finalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortTally {
    edges: BTreeMap<PairKey, EdgeTally>,
    nodes: BTreeMap<String, NodeCategory>,
    graphs_seen: usize,
}

impl CohortTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of graphs absorbed so far.
    pub fn graphs_seen(&self) -> usize {
        self.graphs_seen
    }

    /// Number of distinct edge pairs seen so far.
    pub fn distinct_edges(&self) -> usize {
        self.edges.len()
    }

    /// Fold one patient's graph into the tally.
    ///
    /// Only counts are read from the graph; it is not retained.
    pub fn absorb(&mut self, graph: &AssociationGraph) {
        for (key, edge) in graph.edges() {
            self.edges
                .entry(key.clone())
                .and_modify(|t| t.count += 1)
                .or_insert(EdgeTally {
                    count: 1,
                    kind: edge.kind,
                    class: edge.class,
                });
        }
        for (code, category) in graph.nodes() {
            self.nodes.entry(code.to_string()).or_insert(category);
        }
        self.graphs_seen += 1;
    }

    /// Merge another tally into this one (supports a parallel reduce over
    /// per-patient tallies).
    pub fn merge(&mut self, other: CohortTally) {
        for (key, tally) in other.edges {
            self.edges
                .entry(key)
                .and_modify(|t| t.count += tally.count)
                .or_insert(tally);
        }
        for (code, category) in other.nodes {
            self.nodes.entry(code).or_insert(category);
        }
        self.graphs_seen += other.graphs_seen;
    }

    /// Reduce the tally to an averaged graph.
    ///
    /// Retains pairs seen in at least `cohort_size * threshold_pct / 100`
    /// graphs (inclusive cutoff) and nodes referenced by a retained pair.
    /// Edge strength is the percentage of the cohort exhibiting the pair,
    /// rounded to two decimals.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `cohort_size` is zero or `threshold_pct` is
    /// outside `[0, 100]`.
    pub fn finalize(
        self,
        cohort_size: usize,
        threshold_pct: f64,
    ) -> Result<AveragedGraph, GraphError> {
        if cohort_size == 0 {
            return Err(GraphError::InvalidArgument(
                "cohort size must be positive".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&threshold_pct) {
            return Err(GraphError::InvalidArgument(format!(
                "threshold must be in [0, 100], got {threshold_pct}"
            )));
        }

        let cutoff = cohort_size as f64 * threshold_pct / 100.0;

        let edges: Vec<AveragedEdge> = self
            .edges
            .into_iter()
            .filter(|(_, t)| t.count as f64 >= cutoff)
            .map(|(key, t)| {
                let strength = 100.0 * t.count as f64 / cohort_size as f64;
                AveragedEdge {
                    node1: key.first().to_string(),
                    node2: key.second().to_string(),
                    count: t.count,
                    kind: t.kind,
                    class: t.class,
                    strength: (strength * 100.0).round() / 100.0,
                }
            })
            .collect();

        let nodes: Vec<AveragedNode> = self
            .nodes
            .into_iter()
            .filter(|(code, _)| {
                edges
                    .iter()
                    .any(|e| e.node1 == *code || e.node2 == *code)
            })
            .map(|(code, category)| AveragedNode { code, category })
            .collect();

        Ok(AveragedGraph { nodes, edges })
    }
}

/// A node surviving threshold filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AveragedNode {
    /// Node code.
    pub code: String,

    /// Node category (invariant per code across patients).
    pub category: NodeCategory,
}

/// An edge surviving threshold filtering, with its cohort recurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedEdge {
    /// Lexicographically smaller code of the pair.
    pub node1: String,

    /// Lexicographically larger code of the pair.
    pub node2: String,

    /// Number of patient graphs containing the pair.
    pub count: usize,

    /// Association kind.
    pub kind: EdgeKind,

    /// Classification tag carried from the tally (first-seen).
    pub class: EdgeClass,

    /// Percentage of the cohort exhibiting the pair, rounded to 2 decimals.
    pub strength: f64,
}

/// The averaged cohort graph: tally entries that survived the threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AveragedGraph {
    /// Nodes referenced by at least one retained edge, in code order.
    pub nodes: Vec<AveragedNode>,

    /// Retained edges in canonical pair order.
    pub edges: Vec<AveragedEdge>,
}
