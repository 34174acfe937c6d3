//! JSON export of an analyzed batch for the reporting side.

use crate::error::SimError;
use crate::runner::RunResult;
use roadflow_core::{CleaningReport, HeadwayRecord, TrackedSample, TrafficSummary};
use roadflow_geo::GeodeticFrame;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Complete analysis export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub raw_samples: usize,

    /// Frame of the target_lon / target_lat columns
    pub target_frame: GeodeticFrame,

    pub cleaning: CleaningReport,

    pub summary: TrafficSummary,

    /// Annotated table
    pub table: Vec<TrackedSample>,

    /// Retained headway records
    pub headways: Vec<HeadwayRecord>,
}

impl AnalysisExport {
    /// Creates an export from a finished run.
    pub fn from_result(result: &RunResult) -> Self {
        Self {
            scenario: result.scenario.name().to_string(),
            seed: result.seed,
            raw_samples: result.raw_samples,
            target_frame: result.output.target_frame,
            cleaning: result.output.cleaning.clone(),
            summary: result.output.summary.clone(),
            table: result.output.table.clone(),
            headways: result.output.headways.clone(),
        }
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
