//! Error types for the geodetic abstraction layer.

use crate::frame::GeodeticFrame;
use thiserror::Error;

/// Errors that can occur while converting between geodetic frames.
#[derive(Debug, Error)]
pub enum GeoError {
    /// No implementation exists for the requested frame pair
    #[error("Transform unavailable: {from} -> {to}")]
    TransformUnavailable {
        from: GeodeticFrame,
        to: GeodeticFrame,
    },

    /// Coordinate is not a finite lon/lat within range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Coordinate lies outside the region the transform is defined for
    #[error("Outside transform domain: {0}")]
    OutsideDomain(String),

    /// Frame name or EPSG code could not be parsed
    #[error("Unknown geodetic frame: {0}")]
    UnknownFrame(String),
}

impl GeoError {
    /// Creates an unavailable-transform error.
    pub fn unavailable(from: GeodeticFrame, to: GeodeticFrame) -> Self {
        Self::TransformUnavailable { from, to }
    }

    /// Creates an invalid coordinate error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidCoordinate(msg.into())
    }
}
