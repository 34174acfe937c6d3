//! Error types for the roadflow pipeline.

use roadflow_geo::GeoError;
use thiserror::Error;

/// Errors that can occur while producing or analyzing a trace batch.
///
/// Cleaning and headway analysis never fail on well-typed input; rows that
/// cannot be repaired are dropped and undefined headways are discarded.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A size, cadence or fraction parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The geodetic conversion could not be performed
    #[error("Transform failed: {0}")]
    Transform(#[from] GeoError),
}

impl PipelineError {
    /// Creates an invalid parameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
