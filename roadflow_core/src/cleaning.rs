//! Cleaner - deduplication, imputation and outlier correction.
//!
//! Passes, in order:
//! 1. Deduplicate by (vehicle_id, timestamp), keeping the first row
//! 2. Forward-fill coordinates within each vehicle's chronological sequence
//! 3. Impute missing speed from the (lane, timestamp) group mean, falling
//!    back to the global mean
//! 4. Drop rows that are still incomplete
//! 5. Replace out-of-range speeds with the vehicle's median speed
//! 6. Attach calendar fields
//!
//! Grouped aggregates are built once per pass as explicit key → aggregate
//! maps.

use crate::types::{CleanedSample, LaneId, Sample};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Cleaner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Lowest plausible speed (km/h)
    pub speed_min_kmh: f64,

    /// Highest plausible speed (km/h)
    pub speed_max_kmh: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            speed_min_kmh: 0.0,
            speed_max_kmh: 120.0,
        }
    }
}

impl CleaningConfig {
    /// True if the speed lies inside the plausible range.
    pub fn in_range(&self, speed_kmh: f64) -> bool {
        (self.speed_min_kmh..=self.speed_max_kmh).contains(&speed_kmh)
    }
}

/// Row counts collected while cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub duplicates_removed: usize,
    /// Rows that received at least one forward-filled coordinate
    pub coordinates_filled: usize,
    pub speeds_imputed: usize,
    /// Rows dropped as unrepairable
    pub rows_dropped: usize,
    pub outliers_corrected: usize,
    pub output_rows: usize,
}

/// Cleaned table plus the counts describing how it was produced.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// Sorted by (vehicle_id, timestamp)
    pub samples: Vec<CleanedSample>,
    pub report: CleaningReport,
}

/// Repairs a raw trace table.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleaningConfig,
}

impl Cleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Cleans a table. Never fails; an empty input yields an empty output.
    pub fn clean(&self, samples: Vec<Sample>) -> CleaningOutcome {
        let mut report = CleaningReport {
            input_rows: samples.len(),
            ..Default::default()
        };
        info!("Cleaning {} raw samples", report.input_rows);

        let mut rows = deduplicate(samples);
        report.duplicates_removed = report.input_rows - rows.len();

        rows.sort_by(|a, b| {
            a.vehicle_id
                .cmp(&b.vehicle_id)
                .then(a.timestamp.cmp(&b.timestamp))
        });

        report.coordinates_filled = forward_fill_coordinates(&mut rows);
        report.speeds_imputed = impute_speeds(&mut rows);

        let before_drop = rows.len();
        let mut cleaned: Vec<CleanedSample> = rows.into_iter().filter_map(complete).collect();
        report.rows_dropped = before_drop - cleaned.len();

        report.outliers_corrected = self.correct_outliers(&mut cleaned);
        report.output_rows = cleaned.len();

        debug!(
            "duplicates={} filled={} imputed={} dropped={} outliers={}",
            report.duplicates_removed,
            report.coordinates_filled,
            report.speeds_imputed,
            report.rows_dropped,
            report.outliers_corrected
        );
        info!("Cleaned table has {} samples", report.output_rows);

        CleaningOutcome {
            samples: cleaned,
            report,
        }
    }

    /// Replaces out-of-range speeds with the vehicle's median speed.
    ///
    /// The median is taken over the vehicle's in-range speeds; a vehicle with
    /// none uses the median of all its speeds, even though that value is
    /// itself out of range. Returns the number of rows changed.
    fn correct_outliers(&self, samples: &mut [CleanedSample]) -> usize {
        let medians: HashMap<String, f64> = {
            let mut in_range: HashMap<&str, Vec<f64>> = HashMap::new();
            let mut all: HashMap<&str, Vec<f64>> = HashMap::new();

            for s in samples.iter() {
                all.entry(s.vehicle_id.as_str()).or_default().push(s.speed_kmh);
                if self.config.in_range(s.speed_kmh) {
                    in_range.entry(s.vehicle_id.as_str()).or_default().push(s.speed_kmh);
                }
            }

            all.into_iter()
                .filter_map(|(vehicle, mut speeds)| {
                    let median = match in_range.get_mut(vehicle) {
                        Some(valid) => median(valid),
                        None => {
                            warn!(
                                "Vehicle {} has no in-range speed; using its overall median",
                                vehicle
                            );
                            median(&mut speeds)
                        }
                    }?;
                    Some((vehicle.to_string(), median))
                })
                .collect()
        };

        let mut corrected = 0;
        for s in samples.iter_mut() {
            if self.config.in_range(s.speed_kmh) {
                continue;
            }
            if let Some(&median) = medians.get(&s.vehicle_id) {
                if s.speed_kmh != median {
                    s.speed_kmh = median;
                    corrected += 1;
                }
            }
        }

        corrected
    }
}

/// Treats non-finite values as missing.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Keeps the first row per (vehicle_id, timestamp).
fn deduplicate(samples: Vec<Sample>) -> Vec<Sample> {
    let mut seen: HashSet<(String, NaiveDateTime)> = HashSet::new();

    samples
        .into_iter()
        .filter(|s| seen.insert((s.vehicle_id.clone(), s.timestamp)))
        .map(|mut s| {
            s.lon = finite(s.lon);
            s.lat = finite(s.lat);
            s.speed_kmh = finite(s.speed_kmh);
            s
        })
        .collect()
}

/// Forward-fills lon and lat independently within each vehicle.
///
/// Rows must be sorted by (vehicle_id, timestamp). A vehicle's leading rows
/// without a prior value stay missing.
fn forward_fill_coordinates(rows: &mut [Sample]) -> usize {
    let mut filled = 0;
    let mut current_vehicle: Option<String> = None;
    let mut last_lon: Option<f64> = None;
    let mut last_lat: Option<f64> = None;

    for row in rows.iter_mut() {
        if current_vehicle.as_deref() != Some(row.vehicle_id.as_str()) {
            current_vehicle = Some(row.vehicle_id.clone());
            last_lon = None;
            last_lat = None;
        }

        let mut changed = false;

        match row.lon {
            Some(lon) => last_lon = Some(lon),
            None if last_lon.is_some() => {
                row.lon = last_lon;
                changed = true;
            }
            None => {}
        }

        match row.lat {
            Some(lat) => last_lat = Some(lat),
            None if last_lat.is_some() => {
                row.lat = last_lat;
                changed = true;
            }
            None => {}
        }

        if changed {
            filled += 1;
        }
    }

    filled
}

/// Fills missing speed from the (lane, timestamp) group mean, else the global mean.
fn impute_speeds(rows: &mut [Sample]) -> usize {
    let mut groups: HashMap<(LaneId, NaiveDateTime), (f64, usize)> = HashMap::new();
    let mut global = (0.0, 0usize);

    for row in rows.iter() {
        if let Some(speed) = row.speed_kmh {
            let entry = groups.entry((row.lane, row.timestamp)).or_insert((0.0, 0));
            entry.0 += speed;
            entry.1 += 1;
            global.0 += speed;
            global.1 += 1;
        }
    }

    let global_mean = mean(global);
    let mut imputed = 0;

    for row in rows.iter_mut().filter(|r| r.speed_kmh.is_none()) {
        let group_mean = groups
            .get(&(row.lane, row.timestamp))
            .and_then(|&acc| mean(acc));

        row.speed_kmh = group_mean.or(global_mean);
        if row.speed_kmh.is_some() {
            imputed += 1;
        }
    }

    imputed
}

fn mean((sum, count): (f64, usize)) -> Option<f64> {
    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}

/// Median of the values; the mean of the two middle values for even counts.
pub(crate) fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn complete(row: Sample) -> Option<CleanedSample> {
    Some(CleanedSample::new(
        row.vehicle_id,
        row.timestamp,
        row.lon?,
        row.lat?,
        row.speed_kmh?,
        row.lane,
    ))
}
