//! Reference ellipsoids and geodetic ↔ ECEF conversion.

use crate::error::GeoError;
use nalgebra::Vector3;

/// Latitude convergence threshold for the inverse conversion (radians).
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

/// Iteration cap for the inverse conversion.
const MAX_ITERATIONS: usize = 32;

/// A reference ellipsoid of revolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub semi_major_m: f64,

    /// Inverse flattening 1/f
    pub inverse_flattening: f64,
}

/// A geodetic position: longitude/latitude in degrees, ellipsoidal height in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub height_m: f64,
}

impl Ellipsoid {
    /// WGS84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_m: 6_378_137.0,
        inverse_flattening: 298.257_223_563,
    };

    /// GRS80 ellipsoid (used by CGCS2000).
    pub const GRS80: Ellipsoid = Ellipsoid {
        semi_major_m: 6_378_137.0,
        inverse_flattening: 298.257_222_101,
    };

    /// Flattening f.
    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    /// First eccentricity squared e² = f(2 − f).
    pub fn eccentricity_squared(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// Semi-minor axis b = a(1 − f).
    pub fn semi_minor_m(&self) -> f64 {
        self.semi_major_m * (1.0 - self.flattening())
    }

    /// Prime vertical radius of curvature N(φ).
    fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        let sin_lat = lat_rad.sin();
        self.semi_major_m / (1.0 - self.eccentricity_squared() * sin_lat * sin_lat).sqrt()
    }

    /// Converts a geodetic position to Earth-centred, Earth-fixed coordinates.
    pub fn to_ecef(&self, position: Geodetic) -> Vector3<f64> {
        let lon = position.lon_deg.to_radians();
        let lat = position.lat_deg.to_radians();
        let h = position.height_m;
        let n = self.prime_vertical_radius(lat);
        let e2 = self.eccentricity_squared();

        Vector3::new(
            (n + h) * lat.cos() * lon.cos(),
            (n + h) * lat.cos() * lon.sin(),
            (n * (1.0 - e2) + h) * lat.sin(),
        )
    }

    /// Converts ECEF coordinates back to a geodetic position on this ellipsoid.
    ///
    /// Latitude is solved iteratively until it changes by less than 1e-12 rad.
    pub fn from_ecef(&self, ecef: &Vector3<f64>) -> Result<Geodetic, GeoError> {
        if !(ecef.x.is_finite() && ecef.y.is_finite() && ecef.z.is_finite()) {
            return Err(GeoError::invalid(format!("non-finite ECEF vector {:?}", ecef)));
        }

        let e2 = self.eccentricity_squared();
        let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
        let lon = ecef.y.atan2(ecef.x);

        // On the polar axis the longitude is arbitrary and cos(φ) = 0
        if p < 1e-9 {
            let lat = if ecef.z >= 0.0 { 90.0 } else { -90.0 };
            return Ok(Geodetic {
                lon_deg: lon.to_degrees(),
                lat_deg: lat,
                height_m: ecef.z.abs() - self.semi_minor_m(),
            });
        }

        let mut lat = ecef.z.atan2(p * (1.0 - e2));
        let mut height = 0.0;

        for _ in 0..MAX_ITERATIONS {
            let n = self.prime_vertical_radius(lat);
            height = p / lat.cos() - n;
            let next = ecef.z.atan2(p * (1.0 - e2 * n / (n + height)));
            let delta = (next - lat).abs();
            lat = next;

            if delta < LATITUDE_TOLERANCE_RAD {
                return Ok(Geodetic {
                    lon_deg: lon.to_degrees(),
                    lat_deg: lat.to_degrees(),
                    height_m: height,
                });
            }
        }

        Err(GeoError::invalid(format!(
            "latitude did not converge for ECEF {:?} (last height {:.3} m)",
            ecef, height
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_equator_prime_meridian() {
        let ecef = Ellipsoid::WGS84.to_ecef(Geodetic {
            lon_deg: 0.0,
            lat_deg: 0.0,
            height_m: 0.0,
        });

        assert_abs_diff_eq!(ecef.x, 6_378_137.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ecef_round_trip_same_ellipsoid() {
        let original = Geodetic {
            lon_deg: 116.35,
            lat_deg: 39.95,
            height_m: 45.0,
        };

        let ecef = Ellipsoid::WGS84.to_ecef(original);
        let back = Ellipsoid::WGS84.from_ecef(&ecef).unwrap();

        assert_abs_diff_eq!(back.lon_deg, original.lon_deg, epsilon = 1e-10);
        assert_abs_diff_eq!(back.lat_deg, original.lat_deg, epsilon = 1e-10);
        assert_abs_diff_eq!(back.height_m, original.height_m, epsilon = 1e-4);
    }

    #[test]
    fn test_north_pole() {
        let ecef = Vector3::new(0.0, 0.0, Ellipsoid::WGS84.semi_minor_m());
        let pole = Ellipsoid::WGS84.from_ecef(&ecef).unwrap();

        assert_eq!(pole.lat_deg, 90.0);
        assert_abs_diff_eq!(pole.height_m, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_finite_ecef_rejected() {
        let result = Ellipsoid::GRS80.from_ecef(&Vector3::new(f64::NAN, 0.0, 0.0));
        assert!(matches!(result, Err(GeoError::InvalidCoordinate(_))));
    }
}
