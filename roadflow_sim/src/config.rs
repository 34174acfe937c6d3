//! Simulation configuration.

use crate::generator::GeneratorConfig;
use roadflow_core::PipelineConfig;
use roadflow_geo::GeodeticFrame;
use serde::{Deserialize, Serialize};

/// Configuration for one simulated batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for the trace generator (`None` = OS entropy)
    pub seed: Option<u64>,

    pub generator: GeneratorConfig,

    /// Cleaning / headway settings and the source frame of generated points
    pub pipeline: PipelineConfig,

    /// Frame the projection stage converts into
    pub target_frame: GeodeticFrame,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: Some(42),
            generator: GeneratorConfig::default(),
            pipeline: PipelineConfig::default(),
            target_frame: GeodeticFrame::Cgcs2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_batch() {
        let config = SimConfig::default();

        assert_eq!(config.generator.sample_count(), Some(6000));
        assert_eq!(config.pipeline.source_frame, GeodeticFrame::Wgs84);
        assert_eq!(config.target_frame, GeodeticFrame::Cgcs2000);
        assert!(config.generator.validate().is_ok());
    }
}
