//! Error taxonomy for graph construction, validation and aggregation.

use thiserror::Error;

/// Errors produced by the domain layer.
///
/// Data-access failures are not represented here; they belong to the
/// collaborator implementing [`crate::traits::DataSource`] and are wrapped by
/// the pipeline layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A caller-supplied parameter is outside its valid range
    /// (zero cohort size, threshold outside [0, 100], negative window).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was requested in the wrong phase of the build/validate
    /// protocol (e.g. a found-only view of a graph that was never validated).
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
