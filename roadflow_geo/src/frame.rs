//! Geodetic reference frames known to roadflow.

use crate::ellipsoid::Ellipsoid;
use crate::error::GeoError;
use serde::{Deserialize, Serialize};

/// A geodetic coordinate reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeodeticFrame {
    /// GPS frame (EPSG:4326)
    Wgs84,

    /// China Geodetic Coordinate System 2000 (EPSG:4490)
    Cgcs2000,

    /// Obfuscated national frame used by Chinese map providers
    Gcj02,
}

impl GeodeticFrame {
    /// Returns all known frames.
    pub fn all() -> Vec<GeodeticFrame> {
        vec![
            GeodeticFrame::Wgs84,
            GeodeticFrame::Cgcs2000,
            GeodeticFrame::Gcj02,
        ]
    }

    /// Returns the frame name.
    pub fn name(&self) -> &'static str {
        match self {
            GeodeticFrame::Wgs84 => "WGS84",
            GeodeticFrame::Cgcs2000 => "CGCS2000",
            GeodeticFrame::Gcj02 => "GCJ-02",
        }
    }

    /// Returns the EPSG code, if the frame has one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            GeodeticFrame::Wgs84 => Some(4326),
            GeodeticFrame::Cgcs2000 => Some(4490),
            GeodeticFrame::Gcj02 => None,
        }
    }

    /// Returns the reference ellipsoid.
    ///
    /// GCJ-02 is an offset algorithm rather than a datum and has none.
    pub fn ellipsoid(&self) -> Option<Ellipsoid> {
        match self {
            GeodeticFrame::Wgs84 => Some(Ellipsoid::WGS84),
            GeodeticFrame::Cgcs2000 => Some(Ellipsoid::GRS80),
            GeodeticFrame::Gcj02 => None,
        }
    }
}

impl std::fmt::Display for GeodeticFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for GeodeticFrame {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wgs84" | "wgs-84" | "epsg:4326" | "4326" => Ok(GeodeticFrame::Wgs84),
            "cgcs2000" | "epsg:4490" | "4490" => Ok(GeodeticFrame::Cgcs2000),
            "gcj02" | "gcj-02" => Ok(GeodeticFrame::Gcj02),
            _ => Err(GeoError::UnknownFrame(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_name_and_epsg() {
        assert_eq!("WGS84".parse::<GeodeticFrame>().unwrap(), GeodeticFrame::Wgs84);
        assert_eq!("EPSG:4490".parse::<GeodeticFrame>().unwrap(), GeodeticFrame::Cgcs2000);
        assert_eq!("gcj-02".parse::<GeodeticFrame>().unwrap(), GeodeticFrame::Gcj02);
    }

    #[test]
    fn test_parse_unknown_frame() {
        let err = "EPSG:3857".parse::<GeodeticFrame>().unwrap_err();
        assert!(matches!(err, GeoError::UnknownFrame(_)));
    }

    #[test]
    fn test_display_round_trips() {
        for frame in GeodeticFrame::all() {
            assert_eq!(frame.to_string().parse::<GeodeticFrame>().unwrap(), frame);
        }
    }
}
