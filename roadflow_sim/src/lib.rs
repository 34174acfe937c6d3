//! roadflow Simulation Harness
//!
//! Generates synthetic multi-vehicle GPS batches and drives them through
//! the roadflow pipeline.
//!
//! # Randomness
//!
//! All entropy comes from one ChaCha8 RNG owned by the [`TraceGenerator`].
//! A fixed seed reproduces a batch exactly; no seed draws from the OS.
//!
//! # Flow
//!
//! ```text
//! ScenarioId ──► GeneratorConfig ──► TraceGenerator ──► Vec<Sample>
//!                                                          │
//!            TransformRegistry ──► FrameTransform          ▼
//!                                        │            Pipeline::run
//!                                        └──────────────►  │
//!                                                          ▼
//!                                   RunResult ──► AnalysisExport (JSON)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use roadflow_sim::{PipelineRunner, ScenarioId};
//!
//! let result = PipelineRunner::new(Some(42)).run(ScenarioId::Baseline)?;
//! println!("{} headways", result.output.headways.len());
//! ```

mod config;
mod error;
mod exporter;
mod generator;
mod runner;
pub mod scenarios;

pub use config::SimConfig;
pub use error::SimError;
pub use exporter::AnalysisExport;
pub use generator::{GeneratorConfig, TraceGenerator};
pub use runner::{PipelineRunner, RunResult};
pub use scenarios::ScenarioId;
