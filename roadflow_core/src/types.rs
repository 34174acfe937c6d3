//! Record types flowing between pipeline stages.
//!
//! Each stage consumes one record type and produces the next:
//! `Sample` → `CleanedSample` → `TransformedSample` → `TrackedSample`,
//! with `HeadwayRecord` derived from groups of `TrackedSample`s.

use chrono::{NaiveDateTime, Timelike};
use geo::Point;
use serde::{Deserialize, Serialize};

// =============================================================================
// LANES
// =============================================================================

/// Lane identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneId {
    L1,
    L2,
    L3,
}

impl LaneId {
    /// Returns all lanes.
    pub fn all() -> [LaneId; 3] {
        [LaneId::L1, LaneId::L2, LaneId::L3]
    }

    /// Returns the lane name.
    pub fn name(&self) -> &'static str {
        match self {
            LaneId::L1 => "L1",
            LaneId::L2 => "L2",
            LaneId::L3 => "L3",
        }
    }
}

impl std::fmt::Display for LaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for LaneId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L1" => Ok(LaneId::L1),
            "L2" => Ok(LaneId::L2),
            "L3" => Ok(LaneId::L3),
            _ => Err(format!("Unknown lane: {}", s)),
        }
    }
}

// =============================================================================
// RAW SAMPLES
// =============================================================================

/// One raw observation, keyed by (vehicle_id, timestamp).
///
/// Coordinates and speed may be missing (GPS dropout, sensor fault).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub vehicle_id: String,

    /// Observation time (5 s cadence in generated data)
    pub timestamp: NaiveDateTime,

    /// Longitude in the source frame (degrees)
    pub lon: Option<f64>,

    /// Latitude in the source frame (degrees)
    pub lat: Option<f64>,

    /// Speed in km/h; may be anomalous
    pub speed_kmh: Option<f64>,

    pub lane: LaneId,
}

impl Sample {
    /// Creates a fully populated sample.
    pub fn new(
        vehicle_id: impl Into<String>,
        timestamp: NaiveDateTime,
        lon: f64,
        lat: f64,
        speed_kmh: f64,
        lane: LaneId,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            timestamp,
            lon: Some(lon),
            lat: Some(lat),
            speed_kmh: Some(speed_kmh),
            lane,
        }
    }

    /// True if no field is missing.
    pub fn is_complete(&self) -> bool {
        self.lon.is_some() && self.lat.is_some() && self.speed_kmh.is_some()
    }

    /// Source-frame position, if both coordinates are present.
    pub fn position(&self) -> Option<Point<f64>> {
        Some(Point::new(self.lon?, self.lat?))
    }
}

// =============================================================================
// CLEANED / TRANSFORMED / TRACKED SAMPLES
// =============================================================================

/// A sample with every field repaired and calendar fields attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedSample {
    pub vehicle_id: String,
    pub timestamp: NaiveDateTime,
    pub lon: f64,
    pub lat: f64,
    pub speed_kmh: f64,
    pub lane: LaneId,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CleanedSample {
    /// Creates a cleaned sample, deriving hour/minute/second from the timestamp.
    pub fn new(
        vehicle_id: impl Into<String>,
        timestamp: NaiveDateTime,
        lon: f64,
        lat: f64,
        speed_kmh: f64,
        lane: LaneId,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            timestamp,
            lon,
            lat,
            speed_kmh,
            lane,
            hour: timestamp.hour(),
            minute: timestamp.minute(),
            second: timestamp.second(),
        }
    }

    /// Source-frame position.
    pub fn position(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<CleanedSample> for Sample {
    fn from(cleaned: CleanedSample) -> Self {
        Sample::new(
            cleaned.vehicle_id,
            cleaned.timestamp,
            cleaned.lon,
            cleaned.lat,
            cleaned.speed_kmh,
            cleaned.lane,
        )
    }
}

/// A cleaned sample with its position in the target frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedSample {
    #[serde(flatten)]
    pub sample: CleanedSample,

    /// Longitude in the target frame (degrees)
    pub target_lon: f64,

    /// Latitude in the target frame (degrees)
    pub target_lat: f64,
}

impl TransformedSample {
    pub fn new(sample: CleanedSample, target: Point<f64>) -> Self {
        Self {
            sample,
            target_lon: target.x(),
            target_lat: target.y(),
        }
    }

    /// Target-frame position.
    pub fn target_position(&self) -> Point<f64> {
        Point::new(self.target_lon, self.target_lat)
    }
}

/// A row of the annotated table handed to reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedSample {
    #[serde(flatten)]
    pub sample: TransformedSample,

    /// Distance travelled by this vehicle since its first sample (meters)
    pub cumulative_distance_m: f64,
}

impl TrackedSample {
    pub fn vehicle_id(&self) -> &str {
        &self.sample.sample.vehicle_id
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.sample.sample.timestamp
    }

    pub fn lane(&self) -> LaneId {
        self.sample.sample.lane
    }

    pub fn speed_kmh(&self) -> f64 {
        self.sample.sample.speed_kmh
    }

    pub fn cleaned(&self) -> &CleanedSample {
        &self.sample.sample
    }
}

// =============================================================================
// HEADWAY
// =============================================================================

/// Time gap between two adjacent vehicles in one (lane, timestamp) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadwayRecord {
    pub lane: LaneId,
    pub timestamp: NaiveDateTime,
    pub front_vehicle_id: String,
    pub rear_vehicle_id: String,

    /// Longitudinal gap (meters)
    pub gap_m: f64,

    pub rear_speed_kmh: f64,

    /// Gap divided by the rear vehicle's speed (seconds)
    pub time_headway_s: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_lane_parse_and_display() {
        for lane in LaneId::all() {
            assert_eq!(lane.to_string().parse::<LaneId>().unwrap(), lane);
        }
        assert!("L4".parse::<LaneId>().is_err());
    }

    #[test]
    fn test_cleaned_sample_calendar_fields() {
        let sample = CleanedSample::new("V001", at(8, 9, 35), 116.3, 39.9, 30.0, LaneId::L2);

        assert_eq!(sample.hour, 8);
        assert_eq!(sample.minute, 9);
        assert_eq!(sample.second, 35);
    }

    #[test]
    fn test_sample_position_requires_both_coordinates() {
        let mut sample = Sample::new("V001", at(8, 0, 0), 116.3, 39.9, 30.0, LaneId::L1);
        assert!(sample.position().is_some());
        assert!(sample.is_complete());

        sample.lat = None;
        assert!(sample.position().is_none());
        assert!(!sample.is_complete());
    }

    #[test]
    fn test_cleaned_into_sample_is_complete() {
        let cleaned = CleanedSample::new("V002", at(8, 0, 5), 116.3, 39.9, 42.0, LaneId::L3);
        let sample = Sample::from(cleaned);

        assert!(sample.is_complete());
        assert_eq!(sample.speed_kmh, Some(42.0));
    }
}
