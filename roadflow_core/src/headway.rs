//! Headway Calculator - cumulative distance, lane ordering and time gaps.
//!
//! Steps:
//! 1. Per vehicle, chronologically: haversine distance between consecutive
//!    target-frame positions, summed into a cumulative distance
//! 2. Per (lane, timestamp) group: order vehicles by cumulative distance
//! 3. Per adjacent pair: gap and time headway from the rear vehicle's speed
//! 4. Keep only headways inside the plausible range
//!
//! All traffic is assumed to move in one direction, so the smallest
//! cumulative distance in a group is the rearmost vehicle. This holds for
//! the synthetic scenario only and is not a general traffic model.

use crate::types::{HeadwayRecord, LaneId, TrackedSample, TransformedSample};
use chrono::NaiveDateTime;
use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Earth's mean radius (meters)
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

const KMH_TO_MS: f64 = 1000.0 / 3600.0;

// =============================================================================
// DISTANCE
// =============================================================================

/// Great-circle distance between two lon/lat points (degrees) in meters.
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
/// d = 2·R·asin(√a)
/// ```
pub fn haversine_m(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lon1, lat1) = (a.x().to_radians(), a.y().to_radians());
    let (lon2, lat2) = (b.x().to_radians(), b.y().to_radians());

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push h marginally above 1 for antipodal points
    2.0 * EARTH_MEAN_RADIUS_M * h.min(1.0).sqrt().asin()
}

/// Attaches a cumulative travelled distance to every sample.
///
/// Each vehicle's samples are sorted by timestamp; the first sample has
/// distance 0 and each later one adds the haversine step from its
/// predecessor. Output is ordered by (vehicle_id, timestamp).
pub fn accumulate_distance(samples: Vec<TransformedSample>) -> Vec<TrackedSample> {
    let mut by_vehicle: BTreeMap<String, Vec<TransformedSample>> = BTreeMap::new();
    for sample in samples {
        by_vehicle
            .entry(sample.sample.vehicle_id.clone())
            .or_default()
            .push(sample);
    }

    let mut table = Vec::new();
    for (_, mut track) in by_vehicle {
        track.sort_by_key(|s| s.sample.timestamp);

        let mut cumulative = 0.0;
        let mut previous: Option<Point<f64>> = None;

        for sample in track {
            let position = sample.target_position();
            if let Some(prev) = previous {
                cumulative += haversine_m(prev, position);
            }
            previous = Some(position);

            table.push(TrackedSample {
                sample,
                cumulative_distance_m: cumulative,
            });
        }
    }

    table
}

// =============================================================================
// PAIRING
// =============================================================================

/// An adjacent pair before range filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadwayPair {
    pub lane: LaneId,
    pub timestamp: NaiveDateTime,
    pub front_vehicle_id: String,
    pub rear_vehicle_id: String,
    pub gap_m: f64,
    pub rear_speed_kmh: f64,

    /// `None` when the rear vehicle is not moving
    pub time_headway_s: Option<f64>,
}

/// Time to close `gap_m` at `rear_speed_kmh`; undefined for non-positive speeds.
pub fn time_headway_s(gap_m: f64, rear_speed_kmh: f64) -> Option<f64> {
    let rear_speed_ms = rear_speed_kmh * KMH_TO_MS;
    if rear_speed_ms > 0.0 {
        Some(gap_m / rear_speed_ms)
    } else {
        None
    }
}

/// Pairs adjacent vehicles inside each (lane, timestamp) group.
///
/// Vehicles are ordered by cumulative distance ascending, ties broken by
/// vehicle id. Groups with fewer than two vehicles yield nothing.
pub fn pair_lane_groups(table: &[TrackedSample]) -> Vec<HeadwayPair> {
    let mut groups: BTreeMap<(LaneId, NaiveDateTime), Vec<&TrackedSample>> = BTreeMap::new();
    for row in table {
        groups.entry((row.lane(), row.timestamp())).or_default().push(row);
    }

    let mut pairs = Vec::new();
    for ((lane, timestamp), mut group) in groups {
        if group.len() < 2 {
            continue;
        }

        group.sort_by(|a, b| {
            a.cumulative_distance_m
                .total_cmp(&b.cumulative_distance_m)
                .then_with(|| a.vehicle_id().cmp(b.vehicle_id()))
        });

        for window in group.windows(2) {
            let (rear, front) = (window[0], window[1]);
            let gap_m = front.cumulative_distance_m - rear.cumulative_distance_m;

            pairs.push(HeadwayPair {
                lane,
                timestamp,
                front_vehicle_id: front.vehicle_id().to_string(),
                rear_vehicle_id: rear.vehicle_id().to_string(),
                gap_m,
                rear_speed_kmh: rear.speed_kmh(),
                time_headway_s: time_headway_s(gap_m, rear.speed_kmh()),
            });
        }
    }

    pairs
}

// =============================================================================
// CALCULATOR
// =============================================================================

/// Plausible headway range (exclusive on both ends).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadwayConfig {
    pub min_headway_s: f64,
    pub max_headway_s: f64,
}

impl Default for HeadwayConfig {
    fn default() -> Self {
        Self {
            min_headway_s: 0.0,
            max_headway_s: 30.0,
        }
    }
}

impl HeadwayConfig {
    /// True if `min < headway < max`.
    pub fn accepts(&self, headway_s: f64) -> bool {
        headway_s > self.min_headway_s && headway_s < self.max_headway_s
    }
}

impl HeadwayPair {
    /// Converts to a record if the headway is defined and plausible.
    pub fn retain(self, config: &HeadwayConfig) -> Option<HeadwayRecord> {
        let headway = self.time_headway_s.filter(|&h| config.accepts(h))?;

        Some(HeadwayRecord {
            lane: self.lane,
            timestamp: self.timestamp,
            front_vehicle_id: self.front_vehicle_id,
            rear_vehicle_id: self.rear_vehicle_id,
            gap_m: self.gap_m,
            rear_speed_kmh: self.rear_speed_kmh,
            time_headway_s: headway,
        })
    }
}

/// Output of the headway stage.
#[derive(Debug, Clone)]
pub struct HeadwayAnalysis {
    /// Annotated table, ordered by (vehicle_id, timestamp)
    pub table: Vec<TrackedSample>,

    /// Retained headway records
    pub records: Vec<HeadwayRecord>,

    /// Adjacent pairs considered before filtering
    pub pairs_evaluated: usize,

    /// Pairs dropped as undefined or implausible
    pub pairs_discarded: usize,
}

/// Derives headway records from a transformed table.
#[derive(Debug, Clone, Default)]
pub struct HeadwayCalculator {
    config: HeadwayConfig,
}

impl HeadwayCalculator {
    pub fn new(config: HeadwayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeadwayConfig {
        &self.config
    }

    /// Runs all four steps.
    pub fn analyze(&self, samples: Vec<TransformedSample>) -> HeadwayAnalysis {
        let table = accumulate_distance(samples);
        let (records, pairs_evaluated) = self.evaluate(&table);
        let pairs_discarded = pairs_evaluated - records.len();

        info!(
            "Derived {} headway records from {} pairs ({} discarded)",
            records.len(),
            pairs_evaluated,
            pairs_discarded
        );

        HeadwayAnalysis {
            table,
            records,
            pairs_evaluated,
            pairs_discarded,
        }
    }

    /// Pairs and filters an already annotated table.
    ///
    /// Returns the retained records and the number of pairs evaluated.
    pub fn evaluate(&self, table: &[TrackedSample]) -> (Vec<HeadwayRecord>, usize) {
        let pairs = pair_lane_groups(table);
        let evaluated = pairs.len();

        let undefined = pairs.iter().filter(|p| p.time_headway_s.is_none()).count();
        if undefined > 0 {
            debug!("{} pairs have a stationary rear vehicle", undefined);
        }

        let records = pairs
            .into_iter()
            .filter_map(|pair| pair.retain(&self.config))
            .collect();

        (records, evaluated)
    }
}
