//! Summary statistics handed to the reporting collaborator.
//!
//! Key figures:
//! - Mean speed over the annotated table
//! - Distinct vehicles observed per lane
//! - Mean time headway and the share below the safety threshold
//! - Mean speed per (timestamp, lane), the series behind speed-over-time charts

use crate::types::{HeadwayRecord, LaneId, TrackedSample};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Headways below this are considered unsafe (seconds)
pub const DANGEROUS_HEADWAY_S: f64 = 2.0;

/// Mean speed of one lane at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSpeedPoint {
    pub timestamp: NaiveDateTime,
    pub lane: LaneId,
    pub mean_speed_kmh: f64,
}

/// Aggregate figures over one analyzed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSummary {
    pub sample_count: usize,
    pub vehicle_count: usize,

    /// `None` for an empty table
    pub mean_speed_kmh: Option<f64>,

    /// Distinct vehicles seen in each lane at any time
    pub vehicles_per_lane: BTreeMap<LaneId, usize>,

    pub headway_count: usize,
    pub headways_per_lane: BTreeMap<LaneId, usize>,

    /// `None` when no headway was retained
    pub mean_headway_s: Option<f64>,

    /// Percentage of headways below [`DANGEROUS_HEADWAY_S`]
    pub dangerous_headway_pct: Option<f64>,

    /// Ordered by (timestamp, lane)
    pub lane_speed_series: Vec<LaneSpeedPoint>,
}

impl TrafficSummary {
    /// Computes the summary of an annotated table and its headway records.
    pub fn from_tables(table: &[TrackedSample], records: &[HeadwayRecord]) -> Self {
        let vehicles: BTreeSet<&str> = table.iter().map(|s| s.vehicle_id()).collect();

        let mut lane_vehicles: BTreeMap<LaneId, BTreeSet<&str>> = BTreeMap::new();
        let mut lane_speeds: BTreeMap<(NaiveDateTime, LaneId), (f64, usize)> = BTreeMap::new();
        for row in table {
            lane_vehicles.entry(row.lane()).or_default().insert(row.vehicle_id());

            let acc = lane_speeds.entry((row.timestamp(), row.lane())).or_insert((0.0, 0));
            acc.0 += row.speed_kmh();
            acc.1 += 1;
        }

        let mut headways_per_lane: BTreeMap<LaneId, usize> = BTreeMap::new();
        for record in records {
            *headways_per_lane.entry(record.lane).or_default() += 1;
        }

        let dangerous = records
            .iter()
            .filter(|r| r.time_headway_s < DANGEROUS_HEADWAY_S)
            .count();

        Self {
            sample_count: table.len(),
            vehicle_count: vehicles.len(),
            mean_speed_kmh: mean(table.iter().map(|s| s.speed_kmh())),
            vehicles_per_lane: lane_vehicles
                .into_iter()
                .map(|(lane, ids)| (lane, ids.len()))
                .collect(),
            headway_count: records.len(),
            headways_per_lane,
            mean_headway_s: mean(records.iter().map(|r| r.time_headway_s)),
            dangerous_headway_pct: percentage(dangerous, records.len()),
            lane_speed_series: lane_speeds
                .into_iter()
                .map(|((timestamp, lane), (sum, count))| LaneSpeedPoint {
                    timestamp,
                    lane,
                    mean_speed_kmh: sum / count as f64,
                })
                .collect(),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}

fn percentage(part: usize, total: usize) -> Option<f64> {
    if total > 0 {
        Some(part as f64 / total as f64 * 100.0)
    } else {
        None
    }
}
