//! Error types for batch orchestration.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors surfaced by the pipeline layer.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Domain-level failure (invalid argument or invalid state).
    #[error(transparent)]
    Domain(#[from] medkg_domain::GraphError),

    /// Data-access collaborator failure. Propagated, never retried; a
    /// failure inside one patient's unit of work aborts only that unit.
    #[error("Data access failure: {0}")]
    DataAccess(String),

    /// Export file failure.
    #[error(transparent)]
    Export(#[from] medkg_export::ExportError),

    /// Checkpoint (de)serialization failure.
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] serde_json::Error),

    /// An existing checkpoint belongs to a run with different parameters;
    /// its counts cannot be mixed into this one.
    #[error("Checkpoint mismatch: {0}")]
    CheckpointMismatch(String),

    /// I/O error outside the CSV writers (checkpoint files, directories).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Wrap a data-source error (the trait's error type is associated, so
    /// it is carried as its display form).
    pub fn data_access(err: impl std::fmt::Display) -> Self {
        Self::DataAccess(err.to_string())
    }
}
