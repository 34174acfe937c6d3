//! Error types for the simulation harness.

use roadflow_core::PipelineError;
use thiserror::Error;

/// Errors that can occur while running or exporting a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Generation, transform resolution or pipeline failure
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Export file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
