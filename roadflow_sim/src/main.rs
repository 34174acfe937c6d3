//! roadflow simulator CLI
//!
//! Generate a synthetic batch, run the analysis pipeline and report the
//! key figures.

use clap::Parser;
use roadflow_geo::GeodeticFrame;
use roadflow_sim::{AnalysisExport, PipelineRunner, RunResult, ScenarioId};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// roadflow trajectory analysis simulator
#[derive(Parser, Debug)]
#[command(name = "roadflow-sim")]
#[command(about = "Generate vehicle traces and compute time headways", long_about = None)]
struct Args {
    /// Generator seed (0 = random)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of vehicles (overrides the scenario)
    #[arg(short = 'n', long)]
    vehicles: Option<usize>,

    /// Number of 5-second time steps (overrides the scenario)
    #[arg(short = 't', long)]
    steps: Option<usize>,

    /// Scenario to run (baseline, sparse, dense, faulty_sensors, all)
    #[arg(short = 'S', long, default_value = "baseline")]
    scenario: String,

    /// Target frame (cgcs2000, wgs84, gcj02)
    #[arg(long, default_value = "cgcs2000")]
    target_frame: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Write the full analysis to a JSON file (single scenario only)
    #[arg(long)]
    export: Option<String>,
}

fn report(result: &RunResult) {
    let summary = &result.output.summary;

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("{}: {}", result.scenario.name(), result.scenario.description());
    info!(
        "Samples: {} raw, {} cleaned ({} dropped, {} outliers corrected)",
        result.raw_samples,
        result.output.table.len(),
        result.output.cleaning.rows_dropped,
        result.output.cleaning.outliers_corrected
    );

    match summary.mean_speed_kmh {
        Some(speed) => info!("Mean speed: {:.2} km/h", speed),
        None => info!("Mean speed: n/a"),
    }

    for (lane, count) in &summary.vehicles_per_lane {
        info!("  {} vehicles: {}", lane, count);
    }

    match (summary.mean_headway_s, summary.dangerous_headway_pct) {
        (Some(mean), Some(pct)) => {
            info!("Mean time headway: {:.2} s ({} records)", mean, summary.headway_count);
            info!("Headway < 2 s: {:.2}%", pct);
        }
        _ => info!("No headway records in range"),
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.json { Level::WARN } else { level })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: baseline, sparse, dense, faulty_sensors, all");
            std::process::exit(1);
        })]
    };

    let target_frame: GeodeticFrame = args.target_frame.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        std::process::exit(1);
    }

    let seed = if args.seed == 0 { None } else { Some(args.seed) };

    let mut runner = PipelineRunner::new(seed).with_target_frame(target_frame);
    if let Some(n) = args.vehicles {
        runner = runner.with_vehicles(n);
    }
    if let Some(t) = args.steps {
        runner = runner.with_steps(t);
    }

    let mut exports = Vec::new();
    let mut failed = 0;

    for scenario in &scenarios {
        let result = match runner.run(*scenario) {
            Ok(result) => result,
            Err(e) => {
                error!("✗ {} failed: {}", scenario.name(), e);
                failed += 1;
                continue;
            }
        };

        if !args.json {
            report(&result);
        }

        let export = AnalysisExport::from_result(&result);
        if let Some(path) = &args.export {
            match export.write_to_file(path) {
                Ok(()) => info!("Exported analysis to {}", path),
                Err(e) => {
                    error!("Failed to write export: {}", e);
                    failed += 1;
                }
            }
        }
        exports.push(export);
    }

    if args.json {
        let summary = serde_json::json!({
            "failed": failed,
            "results": exports.iter().map(|e| {
                serde_json::json!({
                    "scenario": e.scenario,
                    "seed": e.seed,
                    "raw_samples": e.raw_samples,
                    "target_frame": e.target_frame,
                    "cleaning": e.cleaning,
                    "summary": e.summary,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed += 1;
            }
        }
    }

    // Exit with proper code for CI
    if failed > 0 {
        std::process::exit(1);
    }
}
