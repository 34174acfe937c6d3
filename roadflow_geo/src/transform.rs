//! The frame conversion seam and the registry that resolves it.

use crate::error::GeoError;
use crate::frame::GeodeticFrame;
use crate::gcj02::Gcj02Transform;
use crate::helmert::{HelmertParams, HelmertTransform};
use geo::Point;
use std::collections::HashMap;

/// Converts single points from one geodetic frame to another.
///
/// Points are `geo::Point` with x = longitude, y = latitude (degrees).
/// Implementations must never return the input unchanged as a fallback:
/// if a point cannot be converted, return an error.
pub trait FrameTransform: Send + Sync {
    /// Frame the input points are expressed in.
    fn source(&self) -> GeodeticFrame;

    /// Frame the output points are expressed in.
    fn target(&self) -> GeodeticFrame;

    /// Converts one point.
    fn convert(&self, point: Point<f64>) -> Result<Point<f64>, GeoError>;
}

/// Validates that a point is a finite, in-range lon/lat pair.
pub(crate) fn check_point(point: Point<f64>) -> Result<(), GeoError> {
    let (lon, lat) = (point.x(), point.y());

    if !lon.is_finite() || !lat.is_finite() {
        return Err(GeoError::invalid(format!("non-finite point ({}, {})", lon, lat)));
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(GeoError::invalid(format!("out of range point ({}, {})", lon, lat)));
    }

    Ok(())
}

/// Resolves frame pairs to transform implementations.
///
/// Helmert parameter sets are registered per ordered frame pair. The
/// WGS84 → GCJ-02 offset is always available; nothing converts out of
/// GCJ-02 since the offset has no closed-form inverse.
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    helmert: HashMap<(GeodeticFrame, GeodeticFrame), HelmertParams>,
}

impl TransformRegistry {
    /// Creates a registry with no Helmert parameter sets.
    pub fn empty() -> Self {
        Self {
            helmert: HashMap::new(),
        }
    }

    /// Registers (or replaces) Helmert parameters for an ordered pair.
    pub fn register_helmert(
        &mut self,
        from: GeodeticFrame,
        to: GeodeticFrame,
        params: HelmertParams,
    ) -> &mut Self {
        self.helmert.insert((from, to), params);
        self
    }

    /// Returns true if `resolve(from, to)` would succeed.
    pub fn supports(&self, from: GeodeticFrame, to: GeodeticFrame) -> bool {
        self.resolve(from, to).is_ok()
    }

    /// Resolves a transform for the ordered pair.
    pub fn resolve(
        &self,
        from: GeodeticFrame,
        to: GeodeticFrame,
    ) -> Result<Box<dyn FrameTransform>, GeoError> {
        if from == GeodeticFrame::Wgs84 && to == GeodeticFrame::Gcj02 {
            return Ok(Box::new(Gcj02Transform::new()));
        }

        let params = match self.helmert.get(&(from, to)) {
            Some(params) => *params,
            // Same datum: only the (identical) ellipsoid round trip remains
            None if from == to => HelmertParams::null(),
            None => return Err(GeoError::unavailable(from, to)),
        };

        Ok(Box::new(HelmertTransform::new(from, to, params)?))
    }
}

impl Default for TransformRegistry {
    /// Registry with the null WGS84 ↔ CGCS2000 shift.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register_helmert(GeodeticFrame::Wgs84, GeodeticFrame::Cgcs2000, HelmertParams::null())
            .register_helmert(GeodeticFrame::Cgcs2000, GeodeticFrame::Wgs84, HelmertParams::null());
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_registry_pairs() {
        let registry = TransformRegistry::default();

        assert!(registry.supports(GeodeticFrame::Wgs84, GeodeticFrame::Cgcs2000));
        assert!(registry.supports(GeodeticFrame::Cgcs2000, GeodeticFrame::Wgs84));
        assert!(registry.supports(GeodeticFrame::Wgs84, GeodeticFrame::Gcj02));
        assert!(registry.supports(GeodeticFrame::Wgs84, GeodeticFrame::Wgs84));
    }

    #[test]
    fn test_out_of_gcj02_is_unavailable() {
        let registry = TransformRegistry::default();

        for to in GeodeticFrame::all() {
            let err = registry.resolve(GeodeticFrame::Gcj02, to).err().unwrap();
            assert!(matches!(err, GeoError::TransformUnavailable { .. }));
        }
    }

    #[test]
    fn test_empty_registry_rejects_cross_datum() {
        let registry = TransformRegistry::empty();
        assert!(!registry.supports(GeodeticFrame::Wgs84, GeodeticFrame::Cgcs2000));
    }

    #[test]
    fn test_resolved_transform_reports_frames() {
        let transform = TransformRegistry::default()
            .resolve(GeodeticFrame::Wgs84, GeodeticFrame::Cgcs2000)
            .unwrap();

        assert_eq!(transform.source(), GeodeticFrame::Wgs84);
        assert_eq!(transform.target(), GeodeticFrame::Cgcs2000);
    }

    #[test]
    fn test_identity_frame_round_trip() {
        let transform = TransformRegistry::default()
            .resolve(GeodeticFrame::Wgs84, GeodeticFrame::Wgs84)
            .unwrap();
        let out = transform.convert(Point::new(116.35, 39.95)).unwrap();

        assert_abs_diff_eq!(out.x(), 116.35, epsilon = 1e-10);
        assert_abs_diff_eq!(out.y(), 39.95, epsilon = 1e-10);
    }

    #[test]
    fn test_check_point_rejects_nan() {
        assert!(check_point(Point::new(f64::NAN, 10.0)).is_err());
        assert!(check_point(Point::new(10.0, 10.0)).is_ok());
    }
}
