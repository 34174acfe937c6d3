//! WGS84 → GCJ-02 offset transform.
//!
//! GCJ-02 is defined by a fixed non-linear offset applied to WGS84 input,
//! expressed with Krasovsky 1940 ellipsoid constants. The algorithm is only
//! defined inside the mainland China bounding box.

use crate::error::GeoError;
use crate::frame::GeodeticFrame;
use crate::transform::{check_point, FrameTransform};
use geo::Point;
use std::f64::consts::PI;

/// Krasovsky 1940 semi-major axis (meters)
const KRASOVSKY_A: f64 = 6_378_245.0;

/// Krasovsky 1940 first eccentricity squared
const KRASOVSKY_EE: f64 = 0.006_693_421_622_965_943;

/// Offset origin
const ORIGIN_LON: f64 = 105.0;
const ORIGIN_LAT: f64 = 35.0;

/// Stateless WGS84 → GCJ-02 converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gcj02Transform;

impl Gcj02Transform {
    pub fn new() -> Self {
        Self
    }

    /// True if the point lies inside the region GCJ-02 is defined for.
    pub fn in_domain(lon: f64, lat: f64) -> bool {
        (72.004..=137.8347).contains(&lon) && (0.8293..=55.8271).contains(&lat)
    }
}

fn offset_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn offset_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

impl FrameTransform for Gcj02Transform {
    fn source(&self) -> GeodeticFrame {
        GeodeticFrame::Wgs84
    }

    fn target(&self) -> GeodeticFrame {
        GeodeticFrame::Gcj02
    }

    fn convert(&self, point: Point<f64>) -> Result<Point<f64>, GeoError> {
        check_point(point)?;

        let (lon, lat) = (point.x(), point.y());
        if !Self::in_domain(lon, lat) {
            return Err(GeoError::OutsideDomain(format!(
                "({:.6}, {:.6}) is outside the GCJ-02 region",
                lon, lat
            )));
        }

        let d_lat = offset_lat(lon - ORIGIN_LON, lat - ORIGIN_LAT);
        let d_lon = offset_lon(lon - ORIGIN_LON, lat - ORIGIN_LAT);

        let rad_lat = lat.to_radians();
        let magic = 1.0 - KRASOVSKY_EE * rad_lat.sin().powi(2);
        let sqrt_magic = magic.sqrt();

        let meridian_radius = (KRASOVSKY_A * (1.0 - KRASOVSKY_EE)) / (magic * sqrt_magic);
        let d_lat = (d_lat * 180.0) / (meridian_radius * PI);
        let d_lon = (d_lon * 180.0) / (KRASOVSKY_A / sqrt_magic * rad_lat.cos() * PI);

        Ok(Point::new(lon + d_lon, lat + d_lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_beijing_offset() {
        let out = Gcj02Transform::new()
            .convert(Point::new(116.397128, 39.916527))
            .unwrap();

        assert_abs_diff_eq!(out.x(), 116.403372494, epsilon = 1e-8);
        assert_abs_diff_eq!(out.y(), 39.917930749, epsilon = 1e-8);
    }

    #[test]
    fn test_generator_box_offset() {
        let out = Gcj02Transform::new()
            .convert(Point::new(116.35, 39.95))
            .unwrap();

        assert_abs_diff_eq!(out.x(), 116.356188275, epsilon = 1e-8);
        assert_abs_diff_eq!(out.y(), 39.951353935, epsilon = 1e-8);
    }

    #[test]
    fn test_outside_china_is_an_error() {
        let result = Gcj02Transform::new().convert(Point::new(-0.1276, 51.5072));
        assert!(matches!(result, Err(GeoError::OutsideDomain(_))));
    }
}
