//! Seven-parameter Helmert transformation between ellipsoid-based frames.

use crate::ellipsoid::{Ellipsoid, Geodetic};
use crate::error::GeoError;
use crate::frame::GeodeticFrame;
use crate::transform::{check_point, FrameTransform};
use geo::Point;
use nalgebra::{Matrix3, Vector3};

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Helmert datum shift parameters (position-vector convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmertParams {
    /// Translation [tx, ty, tz] in meters
    pub translation_m: [f64; 3],

    /// Rotation [rx, ry, rz] in arc-seconds
    pub rotation_arcsec: [f64; 3],

    /// Scale correction in parts per million
    pub scale_ppm: f64,
}

impl HelmertParams {
    /// Null shift. WGS84 and CGCS2000 agree at this level; only the
    /// ellipsoid differs.
    pub const fn null() -> Self {
        Self {
            translation_m: [0.0; 3],
            rotation_arcsec: [0.0; 3],
            scale_ppm: 0.0,
        }
    }

    /// Small-angle rotation matrix R.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        let [rx, ry, rz] = self.rotation_arcsec.map(|r| r * ARCSEC_TO_RAD);
        #[rustfmt::skip]
        let rotation = Matrix3::new(
            1.0, -rz, ry,
            rz, 1.0, -rx,
            -ry, rx, 1.0,
        );
        rotation
    }

    /// Applies X' = T + (1 + s)·R·X.
    pub fn apply(&self, ecef: &Vector3<f64>) -> Vector3<f64> {
        let translation = Vector3::from(self.translation_m);
        let scale = 1.0 + self.scale_ppm * 1e-6;
        translation + self.rotation_matrix() * ecef * scale
    }
}

impl Default for HelmertParams {
    fn default() -> Self {
        Self::null()
    }
}

/// Rigorous frame conversion through geocentric coordinates.
///
/// geodetic (source ellipsoid) → ECEF → Helmert → geodetic (target ellipsoid).
/// Points are taken at zero ellipsoidal height.
#[derive(Debug, Clone)]
pub struct HelmertTransform {
    from: GeodeticFrame,
    to: GeodeticFrame,
    source_ellipsoid: Ellipsoid,
    target_ellipsoid: Ellipsoid,
    params: HelmertParams,
}

impl HelmertTransform {
    /// Creates a transform between two ellipsoid-based frames.
    ///
    /// Fails with `TransformUnavailable` if either frame has no ellipsoid.
    pub fn new(
        from: GeodeticFrame,
        to: GeodeticFrame,
        params: HelmertParams,
    ) -> Result<Self, GeoError> {
        let (source_ellipsoid, target_ellipsoid) = match (from.ellipsoid(), to.ellipsoid()) {
            (Some(s), Some(t)) => (s, t),
            _ => return Err(GeoError::unavailable(from, to)),
        };

        Ok(Self {
            from,
            to,
            source_ellipsoid,
            target_ellipsoid,
            params,
        })
    }

    /// Returns the datum shift parameters.
    pub fn params(&self) -> &HelmertParams {
        &self.params
    }
}

impl FrameTransform for HelmertTransform {
    fn source(&self) -> GeodeticFrame {
        self.from
    }

    fn target(&self) -> GeodeticFrame {
        self.to
    }

    fn convert(&self, point: Point<f64>) -> Result<Point<f64>, GeoError> {
        check_point(point)?;

        let ecef = self.source_ellipsoid.to_ecef(Geodetic {
            lon_deg: point.x(),
            lat_deg: point.y(),
            height_m: 0.0,
        });
        let shifted = self.params.apply(&ecef);
        let result = self.target_ellipsoid.from_ecef(&shifted)?;

        Ok(Point::new(result.lon_deg, result.lat_deg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_null_params_are_identity_on_ecef() {
        let v = Vector3::new(-2_173_227.8, 4_387_548.7, 4_073_731.2);
        let shifted = HelmertParams::null().apply(&v);
        assert_abs_diff_eq!((shifted - v).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_translation_only() {
        let params = HelmertParams {
            translation_m: [1.0, -2.0, 3.0],
            ..HelmertParams::null()
        };
        let shifted = params.apply(&Vector3::zeros());
        assert_eq!(shifted, Vector3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_wgs84_to_cgcs2000_sub_millimetre() {
        let transform = HelmertTransform::new(
            GeodeticFrame::Wgs84,
            GeodeticFrame::Cgcs2000,
            HelmertParams::null(),
        )
        .unwrap();
        assert_eq!(transform.params(), &HelmertParams::null());

        let out = transform.convert(Point::new(116.35, 39.95)).unwrap();

        // Ellipsoid change alone moves latitude by ~1e-9 degrees
        assert_abs_diff_eq!(out.x(), 116.35, epsilon = 1e-10);
        assert_abs_diff_eq!(out.y(), 39.95, epsilon = 1e-8);
        assert!(out.y() != 39.95);
    }

    #[test]
    fn test_gcj02_has_no_ellipsoid() {
        let result = HelmertTransform::new(
            GeodeticFrame::Wgs84,
            GeodeticFrame::Gcj02,
            HelmertParams::null(),
        );
        assert!(matches!(result, Err(GeoError::TransformUnavailable { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_latitude() {
        let transform = HelmertTransform::new(
            GeodeticFrame::Wgs84,
            GeodeticFrame::Cgcs2000,
            HelmertParams::null(),
        )
        .unwrap();

        assert!(transform.convert(Point::new(116.0, 91.0)).is_err());
    }
}
