//! Synthetic trace generator.
//!
//! Produces N vehicles × T time steps of samples:
//! - Positions: a random base point per vehicle plus per-step GPS jitter
//! - Speeds: baseline + uniform variation + a sine wave over the window
//! - Lanes: drawn independently per sample (lane changes are not modelled)
//! - Faults: a fraction of speeds overwritten with out-of-range values and
//!   a fraction of positions dropped
//!
//! All randomness comes from one ChaCha8 RNG owned by the generator.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use roadflow_core::{LaneId, PipelineError, Sample};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Generator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of vehicles (ids V001, V002, ...)
    pub num_vehicles: usize,

    /// Number of time steps per vehicle
    pub time_steps: usize,

    /// Seconds between consecutive time steps
    pub cadence_secs: u32,

    /// Timestamp of the first step
    pub start_time: NaiveDateTime,

    /// Base longitude range [min, max) in degrees
    pub lon_range: (f64, f64),

    /// Base latitude range [min, max) in degrees
    pub lat_range: (f64, f64),

    /// GPS jitter standard deviation (degrees)
    pub position_noise_std_deg: f64,

    pub base_speed_kmh: f64,

    /// Width of the uniform speed variation (km/h)
    pub speed_variation_kmh: f64,

    /// Amplitude of the sine component (km/h)
    pub speed_wave_amplitude_kmh: f64,

    /// Generated speeds are clipped to [0, max_speed_kmh]
    pub max_speed_kmh: f64,

    /// Fraction of samples whose speed is replaced by an anomaly
    pub anomaly_fraction: f64,

    /// Anomalous speed range [min, max) in km/h
    pub anomaly_speed_range: (f64, f64),

    /// Fraction of samples whose coordinates are dropped
    pub missing_fraction: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_vehicles: 50,
            time_steps: 120,
            cadence_secs: 5,
            start_time: NaiveDate::from_ymd_opt(2025, 8, 1)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap_or_default(),
            lon_range: (116.3, 116.4),
            lat_range: (39.9, 40.0),
            position_noise_std_deg: 1e-4,
            base_speed_kmh: 20.0,
            speed_variation_kmh: 30.0,
            speed_wave_amplitude_kmh: 10.0,
            max_speed_kmh: 60.0,
            anomaly_fraction: 0.01,
            anomaly_speed_range: (120.0, 200.0),
            missing_fraction: 0.005,
        }
    }
}

impl GeneratorConfig {
    /// Checks every parameter before any data is produced.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.num_vehicles == 0 {
            return Err(PipelineError::invalid_parameter("vehicle count must be positive"));
        }
        if self.time_steps == 0 {
            return Err(PipelineError::invalid_parameter("time step count must be positive"));
        }
        if self.cadence_secs == 0 {
            return Err(PipelineError::invalid_parameter("cadence must be positive"));
        }

        for (name, fraction) in [
            ("anomaly_fraction", self.anomaly_fraction),
            ("missing_fraction", self.missing_fraction),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(PipelineError::invalid_parameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, fraction
                )));
            }
        }

        for (name, (lo, hi)) in [
            ("lon_range", self.lon_range),
            ("lat_range", self.lat_range),
            ("anomaly_speed_range", self.anomaly_speed_range),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(PipelineError::invalid_parameter(format!(
                    "{} must be a non-empty finite range, got [{}, {})",
                    name, lo, hi
                )));
            }
        }

        if !(self.max_speed_kmh.is_finite() && self.max_speed_kmh >= 0.0) {
            return Err(PipelineError::invalid_parameter("max_speed_kmh must be non-negative"));
        }

        if self.sample_count().is_none() {
            return Err(PipelineError::invalid_parameter(format!(
                "{} vehicles x {} steps overflows the sample count",
                self.num_vehicles, self.time_steps
            )));
        }
        if self.timestamp_at(self.time_steps - 1).is_none() {
            return Err(PipelineError::invalid_parameter(format!(
                "{} steps at {} s cadence run past the representable time range",
                self.time_steps, self.cadence_secs
            )));
        }

        Ok(())
    }

    /// Total number of samples a run produces, `None` on overflow.
    pub fn sample_count(&self) -> Option<usize> {
        self.num_vehicles.checked_mul(self.time_steps)
    }

    /// Timestamp of step `step`, `None` when it is not representable.
    pub fn timestamp_at(&self, step: usize) -> Option<NaiveDateTime> {
        let offset_secs = i64::try_from(step)
            .ok()?
            .checked_mul(i64::from(self.cadence_secs))?;
        self.start_time.checked_add_signed(TimeDelta::try_seconds(offset_secs)?)
    }
}

/// Sine phase of step `i` out of `steps`, evenly spaced over [0, 2π].
fn speed_wave(step: usize, steps: usize) -> f64 {
    if steps < 2 {
        return 0.0;
    }
    (2.0 * PI * step as f64 / (steps - 1) as f64).sin()
}

/// Generates synthetic multi-vehicle traces.
pub struct TraceGenerator {
    config: GeneratorConfig,

    /// `None` when seeded from OS entropy
    seed: Option<u64>,

    rng: ChaCha8Rng,
}

impl TraceGenerator {
    /// Creates a generator. `Some(seed)` makes output reproducible.
    pub fn new(config: GeneratorConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self { config, seed, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Produces `num_vehicles × time_steps` samples with injected faults.
    pub fn generate(&mut self) -> Result<Vec<Sample>, PipelineError> {
        self.config.validate()?;

        let Self { config, rng, .. } = self;

        let jitter = Normal::new(0.0, config.position_noise_std_deg).map_err(|e| {
            PipelineError::invalid_parameter(format!("position noise: {}", e))
        })?;

        let timestamps = (0..config.time_steps)
            .map(|i| config.timestamp_at(i))
            .collect::<Option<Vec<NaiveDateTime>>>()
            .ok_or_else(|| PipelineError::invalid_parameter("timestamp out of range"))?;
        let sample_count = config
            .sample_count()
            .ok_or_else(|| PipelineError::invalid_parameter("sample count overflows"))?;

        let lanes = LaneId::all();
        let mut samples = Vec::with_capacity(sample_count);

        for v in 1..=config.num_vehicles {
            let vehicle_id = format!("V{:03}", v);
            let base_lon = rng.gen_range(config.lon_range.0..config.lon_range.1);
            let base_lat = rng.gen_range(config.lat_range.0..config.lat_range.1);

            for (i, &timestamp) in timestamps.iter().enumerate() {
                let lon = base_lon + jitter.sample(rng);
                let lat = base_lat + jitter.sample(rng);

                let speed = (config.base_speed_kmh
                    + rng.gen::<f64>() * config.speed_variation_kmh
                    + speed_wave(i, config.time_steps) * config.speed_wave_amplitude_kmh)
                    .clamp(0.0, config.max_speed_kmh);

                let lane = lanes[rng.gen_range(0..lanes.len())];

                samples.push(Sample::new(vehicle_id.clone(), timestamp, lon, lat, speed, lane));
            }
        }

        let anomalies = inject_anomalies(&mut samples, config, rng);
        let dropouts = inject_dropouts(&mut samples, config, rng);

        info!(
            "Generated {} samples for {} vehicles ({} anomalies, {} dropouts)",
            samples.len(),
            config.num_vehicles,
            anomalies,
            dropouts
        );

        Ok(samples)
    }
}

/// Overwrites speed on a distinct random subset with out-of-range values.
fn inject_anomalies(
    samples: &mut [Sample],
    config: &GeneratorConfig,
    rng: &mut ChaCha8Rng,
) -> usize {
    let count = (samples.len() as f64 * config.anomaly_fraction).floor() as usize;
    let (lo, hi) = config.anomaly_speed_range;

    for idx in index::sample(rng, samples.len(), count).into_vec() {
        samples[idx].speed_kmh = Some(lo + rng.gen::<f64>() * (hi - lo));
    }

    debug!("Injected {} speed anomalies", count);
    count
}

/// Drops both coordinates on a distinct random subset, drawn independently
/// of the anomaly subset.
fn inject_dropouts(
    samples: &mut [Sample],
    config: &GeneratorConfig,
    rng: &mut ChaCha8Rng,
) -> usize {
    let count = (samples.len() as f64 * config.missing_fraction).floor() as usize;

    for idx in index::sample(rng, samples.len(), count).into_vec() {
        samples[idx].lon = None;
        samples[idx].lat = None;
    }

    debug!("Injected {} GPS dropouts", count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_generates_n_times_t_samples() {
        let config = GeneratorConfig {
            num_vehicles: 4,
            time_steps: 10,
            ..Default::default()
        };

        let samples = TraceGenerator::new(config, Some(42)).generate().unwrap();

        assert_eq!(samples.len(), 40);
        let ids: HashSet<_> = samples.iter().map(|s| s.vehicle_id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.contains("V001"));
        assert!(ids.contains("V004"));
    }

    #[test]
    fn test_cadence_and_start_time() {
        let config = GeneratorConfig {
            num_vehicles: 1,
            time_steps: 3,
            ..Default::default()
        };

        let mut generator = TraceGenerator::new(config.clone(), Some(1));
        assert_eq!(generator.seed(), Some(1));
        assert_eq!(generator.config().time_steps, 3);

        let samples = generator.generate().unwrap();

        assert_eq!(samples[0].timestamp, config.start_time);
        assert_eq!(samples[2].timestamp - samples[1].timestamp, TimeDelta::seconds(5));
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = GeneratorConfig {
            num_vehicles: 5,
            time_steps: 20,
            ..Default::default()
        };

        let a = TraceGenerator::new(config.clone(), Some(7)).generate().unwrap();
        let b = TraceGenerator::new(config, Some(7)).generate().unwrap();

        // Same seed = same trace
        assert_eq!(a, b);
    }

    #[test]
    fn test_fault_injection_counts() {
        let samples = TraceGenerator::new(GeneratorConfig::default(), Some(42))
            .generate()
            .unwrap();

        let anomalies = samples
            .iter()
            .filter(|s| s.speed_kmh.map_or(false, |v| v >= 120.0))
            .count();
        let dropouts = samples.iter().filter(|s| s.lon.is_none()).count();

        assert_eq!(samples.len(), 6000);
        assert_eq!(anomalies, 60);
        assert_eq!(dropouts, 30);
        assert!(samples.iter().all(|s| s.lon.is_none() == s.lat.is_none()));
    }

    #[test]
    fn test_speeds_and_positions_in_bounds() {
        let config = GeneratorConfig {
            anomaly_fraction: 0.0,
            missing_fraction: 0.0,
            ..Default::default()
        };

        let samples = TraceGenerator::new(config, Some(3)).generate().unwrap();

        for s in &samples {
            let speed = s.speed_kmh.unwrap();
            assert!((0.0..=60.0).contains(&speed));
            // Jitter is 1e-4 deg; 0.01 is ~100 sigma
            assert!((116.29..116.41).contains(&s.lon.unwrap()));
            assert!((39.89..40.01).contains(&s.lat.unwrap()));
        }
    }

    #[test]
    fn test_zero_vehicles_rejected() {
        let config = GeneratorConfig {
            num_vehicles: 0,
            ..Default::default()
        };

        let result = TraceGenerator::new(config, Some(1)).generate();
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_zero_steps_rejected() {
        let config = GeneratorConfig {
            time_steps: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fraction_out_of_range_rejected() {
        let config = GeneratorConfig {
            anomaly_fraction: 1.5,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unreachable_timestamp_rejected_before_generation() {
        let config = GeneratorConfig {
            num_vehicles: 1,
            time_steps: 3000,
            cadence_secs: u32::MAX,
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(PipelineError::InvalidParameter(_))));

        let mut generator = TraceGenerator::new(config, Some(1));
        assert!(matches!(generator.generate(), Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_sample_count_overflow_rejected() {
        let config = GeneratorConfig {
            num_vehicles: usize::MAX,
            time_steps: 2,
            ..Default::default()
        };

        assert_eq!(config.sample_count(), None);
        assert!(matches!(config.validate(), Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_timestamp_at_follows_cadence() {
        let config = GeneratorConfig::default();

        assert_eq!(config.timestamp_at(0), Some(config.start_time));
        assert_eq!(
            config.timestamp_at(3),
            Some(config.start_time + TimeDelta::seconds(15))
        );
    }

    #[test]
    fn test_speed_wave_endpoints() {
        assert_eq!(speed_wave(0, 120), 0.0);
        assert!(speed_wave(119, 120).abs() < 1e-9);
        assert!((speed_wave(30, 121) - 1.0).abs() < 1e-9);
        assert_eq!(speed_wave(0, 1), 0.0);
    }

    proptest! {
        #[test]
        fn prop_shape_holds_for_any_seed(seed in any::<u64>(), n in 1..8usize, t in 1..30usize) {
            let config = GeneratorConfig {
                num_vehicles: n,
                time_steps: t,
                ..Default::default()
            };

            let samples = TraceGenerator::new(config, Some(seed)).generate().unwrap();

            prop_assert_eq!(samples.len(), n * t);
            let keys: HashSet<_> = samples
                .iter()
                .map(|s| (s.vehicle_id.clone(), s.timestamp))
                .collect();
            prop_assert_eq!(keys.len(), n * t);
            for speed in samples.iter().filter_map(|s| s.speed_kmh) {
                prop_assert!((0.0..=60.0).contains(&speed) || (120.0..200.0).contains(&speed));
            }
        }
    }
}
