//! Command implementations.

mod averaged_graph;
mod patient_graphs;

pub use averaged_graph::execute_averaged_graph;
pub use patient_graphs::execute_patient_graphs;
