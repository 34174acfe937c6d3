//! Pipeline runner - generates a scenario batch and analyzes it.

use crate::config::SimConfig;
use crate::error::SimError;
use crate::generator::TraceGenerator;
use crate::scenarios::ScenarioId;
use roadflow_core::{Pipeline, PipelineError, PipelineOutput};
use roadflow_geo::{GeodeticFrame, TransformRegistry};
use tracing::info;

/// Results from running one scenario.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used (`None` = OS entropy)
    pub seed: Option<u64>,

    /// Rows produced by the generator
    pub raw_samples: usize,

    /// Everything handed to reporting
    pub output: PipelineOutput,
}

/// Runs scenarios end to end.
pub struct PipelineRunner {
    /// Generator seed
    seed: Option<u64>,

    /// Overrides the scenario's vehicle count
    num_vehicles: Option<usize>,

    /// Overrides the scenario's step count
    time_steps: Option<usize>,

    /// Projection target
    target_frame: GeodeticFrame,

    /// Available frame conversions
    registry: TransformRegistry,
}

impl PipelineRunner {
    /// Creates a new runner with the default target frame and registry.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            num_vehicles: None,
            time_steps: None,
            target_frame: SimConfig::default().target_frame,
            registry: TransformRegistry::default(),
        }
    }

    /// Sets the vehicle count.
    pub fn with_vehicles(mut self, num_vehicles: usize) -> Self {
        self.num_vehicles = Some(num_vehicles);
        self
    }

    /// Sets the step count.
    pub fn with_steps(mut self, time_steps: usize) -> Self {
        self.time_steps = Some(time_steps);
        self
    }

    /// Sets the projection target frame.
    pub fn with_target_frame(mut self, frame: GeodeticFrame) -> Self {
        self.target_frame = frame;
        self
    }

    /// Replaces the transform registry.
    pub fn with_registry(mut self, registry: TransformRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Builds the configuration a scenario runs with.
    pub fn config_for(&self, scenario: ScenarioId) -> SimConfig {
        let mut generator = scenario.generator_config();
        if let Some(n) = self.num_vehicles {
            generator.num_vehicles = n;
        }
        if let Some(t) = self.time_steps {
            generator.time_steps = t;
        }

        SimConfig {
            seed: self.seed,
            generator,
            target_frame: self.target_frame,
            ..Default::default()
        }
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<RunResult, SimError> {
        info!("Starting scenario: {} (seed={:?})", scenario.name(), self.seed);
        self.run_config(scenario, self.config_for(scenario))
    }

    /// Runs an explicit configuration, labelled with `scenario`.
    ///
    /// The transform is resolved before any data is generated so a missing
    /// conversion fails without doing work.
    pub fn run_config(
        &self,
        scenario: ScenarioId,
        config: SimConfig,
    ) -> Result<RunResult, SimError> {
        let transform = self
            .registry
            .resolve(config.pipeline.source_frame, config.target_frame)
            .map_err(PipelineError::from)?;

        let mut generator = TraceGenerator::new(config.generator, config.seed);
        let samples = generator.generate()?;
        let raw_samples = samples.len();

        let output = Pipeline::new(config.pipeline).run(samples, transform.as_ref())?;

        info!(
            "{}: {} raw -> {} cleaned samples, {} headways",
            scenario.name(),
            raw_samples,
            output.table.len(),
            output.headways.len()
        );

        Ok(RunResult {
            scenario,
            seed: config.seed,
            raw_samples,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let runner = PipelineRunner::new(Some(1)).with_vehicles(3).with_steps(7);
        let config = runner.config_for(ScenarioId::Dense);

        assert_eq!(config.generator.num_vehicles, 3);
        assert_eq!(config.generator.time_steps, 7);
        assert_eq!(config.seed, Some(1));
    }

    #[test]
    fn test_small_run() {
        let result = PipelineRunner::new(Some(42))
            .with_vehicles(10)
            .with_steps(20)
            .run(ScenarioId::Baseline)
            .unwrap();

        assert_eq!(result.raw_samples, 200);
        assert!(result.output.table.len() <= 200);
        assert_eq!(result.output.summary.vehicle_count, 10);
    }

    #[test]
    fn test_missing_transform_fails_before_generation() {
        let result = PipelineRunner::new(Some(42))
            .with_registry(TransformRegistry::empty())
            .run(ScenarioId::Baseline);

        assert!(matches!(result, Err(SimError::Pipeline(PipelineError::Transform(_)))));
    }

    #[test]
    fn test_invalid_vehicle_count() {
        let result = PipelineRunner::new(Some(42)).with_vehicles(0).run(ScenarioId::Baseline);

        assert!(matches!(
            result,
            Err(SimError::Pipeline(PipelineError::InvalidParameter(_)))
        ));
    }
}
