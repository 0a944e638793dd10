//! # flightsim — virtual flight test entry point
//!
//! Startup sequence:
//!
//! 1. Load the simulation configuration (fatal if missing or malformed).
//! 2. Initialise logging per `log_config`.
//! 3. Parse and validate the flight plan; seed the shared data space.
//! 4. Create the data recorder and attach it.
//! 5. Spawn the workers layer by layer, waiting for each step-0 pass.
//! 6. Run the clock; on return, drain workers, flush the recorder, and log
//!    the performance summary.
//!
//! Exit code 0 on normal completion; nonzero on startup failure or a
//! suspected deadlock.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;

use flightsim_app::perf::SimPerformance;
use flightsim_app::recorder::CsvDataRecorder;
use flightsim_app::{Simulation, logging};
use flightsim_scenario::{FlightPlanLoader, SimulationConfig};

/// Virtual flight test simulation.
#[derive(Debug, Parser)]
#[command(name = "flightsim", version, about)]
struct Args {
    /// Path to the simulation configuration file.
    #[arg(long, default_value = "config/SimulationConfig.json")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = SimulationConfig::load(&args.config)
        .with_context(|| format!("loading configuration {}", args.config.display()))?;
    logging::init_logging(&config.log_config)?;

    let mut performance = SimPerformance::new();
    performance.start();
    info!(config = %args.config.display(), "flight simulation starting");

    let loader = FlightPlanLoader::from_file(&config.flight_plan_file).with_context(|| {
        format!("loading flight plan {}", config.flight_plan_file.display())
    })?;

    let recorder = CsvDataRecorder::create(&config.data_recorder_config)?;

    let mut sim = Simulation::new(&config.simulation_params);
    sim.sds().attach_recorder(recorder.sink());
    sim.load(&loader);
    sim.spawn_standard_agents()?;

    let outcome = sim.run();
    recorder.shutdown();

    performance.finish();
    info!(
        "{}",
        performance.report(
            outcome.steps as f64 * config.simulation_params.time_step,
            config.simulation_params.time_step,
            outcome.steps,
        )
    );

    if outcome.deadlock() {
        bail!("simulation aborted: deadlock suspected at step {}", outcome.steps);
    }
    info!("flight simulation finished");
    Ok(())
}
