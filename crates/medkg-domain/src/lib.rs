//! medkg Domain Layer
//!
//! This crate contains the core data model and algorithms for building
//! per-patient association graphs and averaging them across a cohort.
//! Infrastructure (SQLite access, CSV export, batch orchestration) lives in
//! other crates; this one only knows about codes, dates and graphs.
//!
//! ## Key Concepts
//!
//! - **PatientRecord**: one patient's dated drug and diagnosis events
//! - **Literature**: drug–disease and disease–disease association tables
//! - **AssociationGraph**: the per-patient graph of grounded associations
//! - **TemporalValidator**: reclassifies literature edges that the patient's
//!   own timeline corroborates within a date window
//! - **CohortTally / AveragedGraph**: recurrence counts across many patients
//!   reduced to a threshold-filtered averaged graph
//!
//! ## Architecture
//!
//! Two-phase protocol per patient: build the graph, then validate it in
//! place. Views (`without_isolates`, `found_only`) are derived afterwards and
//! never mutate the source graph. The `DataSource` trait in [`traits`] is the
//! only boundary to the outside world.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod graph;
pub mod literature;
pub mod patient;
pub mod traits;
pub mod validate;
pub mod views;

// Re-exports for convenience
pub use aggregate::{AveragedEdge, AveragedGraph, AveragedNode, CohortTally};
pub use error::GraphError;
pub use filter::RelevantRecords;
pub use graph::{AssociationGraph, Edge, EdgeClass, EdgeKind, NodeCategory, PairKey};
pub use literature::{DiseaseDiseaseAssoc, DrugDiseaseAssoc, Literature};
pub use patient::{DiagnosisEvent, DrugEvent, PatientId, PatientRecord};
pub use validate::{EventDates, FoundSets, TemporalValidator};
pub use views::GraphView;
