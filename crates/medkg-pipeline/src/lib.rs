//! medkg Pipeline Layer
//!
//! Batch orchestration over the domain algorithms: one unit of work per
//! patient (fetch, filter, build, validate, export), failure isolation so a
//! bad patient never poisons the rest of the run, and resumable iteration
//! for both batch kinds:
//!
//! - patient-graph batches journal completed ids in the statistics file and
//!   skip them on restart;
//! - cohort runs checkpoint the running tally to JSON at a configurable
//!   cadence and pick it up on restart.
//!
//! Everything is synchronous and single-threaded; the tally fold is
//! order-independent, so a future parallel reduce would produce identical
//! output.

#![warn(missing_docs)]

pub mod batch;
pub mod checkpoint;
pub mod cohort;
pub mod config;
pub mod error;
pub mod patient;

#[cfg(test)]
mod testutil;

pub use batch::{BatchSummary, PatientBatch};
pub use cohort::{cohort_patients, CohortRun, CohortSummary};
pub use config::{BatchConfig, CohortConfig};
pub use error::PipelineError;
pub use patient::{build_patient_graph, PatientGraph};
