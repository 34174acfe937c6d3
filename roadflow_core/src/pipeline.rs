//! Pipeline - chains Cleaner → Projection → Headway Calculator → Summary.
//!
//! Each stage takes the full table by value and hands a new table to the
//! next; nothing is shared between stages.

use crate::cleaning::{Cleaner, CleaningConfig, CleaningReport};
use crate::error::PipelineError;
use crate::headway::{HeadwayCalculator, HeadwayConfig};
use crate::projection::project;
use crate::stats::TrafficSummary;
use crate::types::{HeadwayRecord, Sample, TrackedSample};
use roadflow_geo::{FrameTransform, GeodeticFrame};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub cleaning: CleaningConfig,
    pub headway: HeadwayConfig,

    /// Frame the raw sample coordinates are expressed in
    pub source_frame: GeodeticFrame,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cleaning: CleaningConfig::default(),
            headway: HeadwayConfig::default(),
            source_frame: GeodeticFrame::Wgs84,
        }
    }
}

/// Everything the reporting collaborator receives.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub cleaning: CleaningReport,

    /// Frame of the `target_lon`/`target_lat` columns
    pub target_frame: GeodeticFrame,

    /// Annotated table, ordered by (vehicle_id, timestamp)
    pub table: Vec<TrackedSample>,

    /// Headway records inside the plausible range
    pub headways: Vec<HeadwayRecord>,

    pub pairs_evaluated: usize,
    pub pairs_discarded: usize,

    pub summary: TrafficSummary,
}

/// The trajectory analysis pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: Cleaner,
    calculator: HeadwayCalculator,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            cleaner: Cleaner::new(config.cleaning.clone()),
            calculator: HeadwayCalculator::new(config.headway.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage over one batch.
    ///
    /// Only the projection stage can fail.
    pub fn run(
        &self,
        samples: Vec<Sample>,
        transform: &dyn FrameTransform,
    ) -> Result<PipelineOutput, PipelineError> {
        info!(
            "Pipeline: {} samples, {} -> {}",
            samples.len(),
            self.config.source_frame,
            transform.target()
        );

        let cleaned = self.cleaner.clean(samples);
        let projected = project(cleaned.samples, self.config.source_frame, transform)?;
        let analysis = self.calculator.analyze(projected);
        let summary = TrafficSummary::from_tables(&analysis.table, &analysis.records);

        Ok(PipelineOutput {
            cleaning: cleaned.report,
            target_frame: transform.target(),
            table: analysis.table,
            headways: analysis.records,
            pairs_evaluated: analysis.pairs_evaluated,
            pairs_discarded: analysis.pairs_discarded,
            summary,
        })
    }
}
