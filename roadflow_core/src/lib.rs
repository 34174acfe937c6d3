//! roadflow Core - Vehicle Trajectory Analysis
//!
//! Turns one in-memory batch of multi-vehicle GPS samples into safety
//! metrics:
//! 1. **Cleaning**: deduplication, grouped imputation, median outlier correction
//! 2. **Projection**: per-sample conversion into a target geodetic frame
//! 3. **Headway**: haversine cumulative distance, per-lane ordering and
//!    time gaps between adjacent vehicles
//! 4. **Summary**: aggregate figures for reporting

pub mod cleaning;
pub mod error;
pub mod headway;
pub mod pipeline;
pub mod projection;
pub mod stats;
pub mod types;

// Re-export key types for convenience
pub use cleaning::{Cleaner, CleaningConfig, CleaningOutcome, CleaningReport};
pub use error::PipelineError;
pub use headway::{haversine_m, HeadwayAnalysis, HeadwayCalculator, HeadwayConfig};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use stats::TrafficSummary;
pub use types::{CleanedSample, HeadwayRecord, LaneId, Sample, TrackedSample, TransformedSample};
