//! Simulation assembly.
//!
//! [`Simulation`] wires the pieces together in the startup order the
//! architecture requires: load the plan, spawn the workers layer by layer
//! (waiting for each to finish its step-0 pass), publish the step-0
//! snapshot, then hand control to the clock. Shutdown drains the worker
//! threads — bounded, so a genuinely stuck worker cannot hang the process —
//! and flushes the recorder.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use tracing::{info, warn};

use flightsim_agent::{AgentBehavior, AgentConfig, AgentRunner, wait_for_ready};
use flightsim_data::{SharedDataSpace, WorkerKind};
use flightsim_scenario::{FlightPlanLoader, SimulationParams};

use crate::agents::{
    AircraftSystemAgent, AtcAgent, EnvironmentAgent, FlightDynamicsAgent, PilotAgent,
};
use crate::clock::{ClockConfig, RunOutcome, SimulationClock};
use crate::dispatcher::{ENVIRONMENT_AGENT_ID, EventDispatcher};
use crate::monitor::{EventMonitor, TriggerStatistics};
use crate::perf::StepTiming;

/// Worker id of the event monitor.
pub const MONITOR_ID: &str = "event_monitor";
/// Worker id of the event dispatcher.
pub const DISPATCHER_ID: &str = "event_dispatcher";
/// Worker id of the flight-dynamics agent.
pub const FLIGHT_DYNAMICS_ID: &str = "FlightDynamics_001";

const READY_TIMEOUT: Duration = Duration::from_secs(5);
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// How a whole simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// The clock's verdict.
    pub run: RunOutcome,
    /// Steps the clock advanced past.
    pub steps: u64,
}

impl SimulationOutcome {
    /// Whether the run ended in a suspected deadlock.
    #[must_use]
    pub fn deadlock(&self) -> bool {
        matches!(self.run, RunOutcome::DeadlockSuspected { .. })
    }
}

/// One assembled simulation run.
pub struct Simulation {
    sds: Arc<SharedDataSpace>,
    clock_config: ClockConfig,
    handles: Vec<(String, JoinHandle<()>)>,
    monitor_stats: Option<Arc<Mutex<TriggerStatistics>>>,
    dynamics_timing: Option<Arc<Mutex<StepTiming>>>,
}

impl Simulation {
    /// Create a simulation from the timing parameters.
    #[must_use]
    pub fn new(params: &SimulationParams) -> Self {
        let clock_config = ClockConfig {
            time_step: params.time_step,
            time_scale: params.time_scale,
            max_simulation_time: params.max_simulation_time,
            deadlock_window: Duration::from_secs_f64(params.sync_tolerance.max(0.001)),
            ..ClockConfig::default()
        };
        Self {
            sds: Arc::new(SharedDataSpace::new(params.time_step)),
            clock_config,
            handles: Vec::new(),
            monitor_stats: None,
            dynamics_timing: None,
        }
    }

    /// The shared data space of this run.
    #[must_use]
    pub fn sds(&self) -> &Arc<SharedDataSpace> {
        &self.sds
    }

    /// Statistics handle of the event monitor, once spawned.
    #[must_use]
    pub fn monitor_stats(&self) -> Option<Arc<Mutex<TriggerStatistics>>> {
        self.monitor_stats.clone()
    }

    /// Run the loader against this simulation's data space.
    pub fn load(&self, loader: &FlightPlanLoader) {
        loader.store(&self.sds);
    }

    /// Spawn one worker and wait for it to finish its step-0 pass.
    ///
    /// # Errors
    ///
    /// Fails if the thread cannot be spawned or never becomes ready.
    pub fn spawn_worker<B>(&mut self, config: AgentConfig, behavior: B) -> anyhow::Result<()>
    where
        B: AgentBehavior + 'static,
    {
        let id = config.thread_id.clone();
        let handle = AgentRunner::new(config, self.sds.clone())
            .spawn(behavior)
            .with_context(|| format!("spawning worker {id}"))?;
        self.handles.push((id.clone(), handle));
        if !wait_for_ready(&self.sds, &id, READY_TIMEOUT) {
            bail!("worker {id} did not become ready");
        }
        Ok(())
    }

    /// Spawn the standard worker set in dependency order: environment,
    /// aircraft system, flight dynamics, pilot, ATC, then the event
    /// monitor and the event dispatcher. The dispatcher runs each step
    /// after the monitor, and every agent runs after the dispatcher.
    ///
    /// # Errors
    ///
    /// Fails if any worker cannot be spawned or never becomes ready.
    pub fn spawn_standard_agents(&mut self) -> anyhow::Result<()> {
        let scenario = self.sds.flight_plan_data().value.scenario_config;

        self.spawn_worker(
            AgentConfig::new(ENVIRONMENT_AGENT_ID, "environment", WorkerKind::Environment)
                .with_wait_for([DISPATCHER_ID]),
            EnvironmentAgent,
        )?;
        self.spawn_worker(
            AgentConfig::new(
                scenario.aircraft_id.clone(),
                "aircraft_system",
                WorkerKind::AircraftSystem,
            )
            .with_wait_for([DISPATCHER_ID]),
            AircraftSystemAgent::new(),
        )?;

        let dynamics = FlightDynamicsAgent::with_default_model();
        self.dynamics_timing = Some(dynamics.timing_handle());
        self.spawn_worker(
            AgentConfig::new(FLIGHT_DYNAMICS_ID, "flight_dynamics", WorkerKind::FlightDynamics)
                .with_wait_for([DISPATCHER_ID]),
            dynamics,
        )?;

        self.spawn_worker(
            AgentConfig::new(scenario.pilot_id.clone(), "pilot", WorkerKind::Pilot)
                .with_wait_for([DISPATCHER_ID]),
            PilotAgent::new(&scenario.pilot_id),
        )?;
        self.spawn_worker(
            AgentConfig::new(scenario.atc_id.clone(), "atc", WorkerKind::Atc)
                .with_wait_for([DISPATCHER_ID]),
            AtcAgent::new(&scenario.atc_id),
        )?;

        let monitor = EventMonitor::new();
        self.monitor_stats = Some(monitor.stats_handle());
        self.spawn_worker(
            AgentConfig::new(MONITOR_ID, "event_monitor", WorkerKind::EventMonitor),
            monitor,
        )?;
        self.spawn_worker(
            AgentConfig::new(DISPATCHER_ID, "event_dispatcher", WorkerKind::EventDispatcher)
                .with_wait_for([MONITOR_ID]),
            EventDispatcher::from_scenario(&scenario),
        )?;

        info!(workers = self.handles.len(), "standard workers ready");
        Ok(())
    }

    /// Publish the step-0 snapshot, run the clock to completion, drain the
    /// workers, flush the recorder.
    pub fn run(&mut self) -> SimulationOutcome {
        // The loader's writes and the agents' initial updates are the
        // step-0 snapshot.
        self.sds.publish_to_data_recorder(0.0);

        let mut clock = SimulationClock::new(self.clock_config.clone(), self.sds.clone());
        let run = clock.run();
        let steps = clock.current_step();

        self.join_workers();
        self.sds.flush_recorder();

        if let Some(stats) = &self.monitor_stats {
            info!("{}", stats.lock().expect("monitor stats poisoned").report());
        }
        if let Some(timing) = &self.dynamics_timing {
            let timing = timing.lock().expect("timing sample poisoned");
            info!(
                samples = timing.samples(),
                avg_us = timing.average().as_micros() as u64,
                max_us = timing.max().as_micros() as u64,
                "flight-dynamics step timing"
            );
        }

        SimulationOutcome { run, steps }
    }

    /// Join worker threads with a bound: a worker that ignores the shutdown
    /// cue is detached rather than allowed to hang the process.
    fn join_workers(&mut self) {
        let deadline = Instant::now() + JOIN_TIMEOUT;
        for (id, handle) in self.handles.drain(..) {
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_micros(500));
            }
            if handle.is_finished() {
                if handle.join().is_err() {
                    warn!(worker = id, "worker thread panicked");
                }
            } else {
                warn!(worker = id, "worker did not exit in time; detached");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use flightsim_scenario::FlightPlanLoader;

    use super::*;

    fn empty_plan() -> serde_json::Value {
        json!({
            "flight_plan": {
                "scenario_config": { "ScenarioName": "empty" },
                "global_initial_state": {
                    "flight_dynamics_initial_state": {},
                    "pilot_initial_state": {},
                    "aircraft_initial_state": {},
                    "environment_initial_state": {},
                    "atc_control_initial_state": {}
                },
                "logic_lines": {
                    "pilot_logic_line": { "logic_sequence": [] },
                    "aircraft_system_logic_line": { "logic_sequence": [] },
                    "environment_logic_line": { "logic_sequence": [] },
                    "ATC_logic_line": { "logic_sequence": [] }
                }
            }
        })
    }

    fn fast_params(max_simulation_time: f64) -> SimulationParams {
        SimulationParams {
            time_scale: 0.0,
            time_step: 0.01,
            max_simulation_time,
            sync_tolerance: 5.0,
        }
    }

    #[test]
    fn test_empty_scenario_runs_to_completion() {
        let mut sim = Simulation::new(&fast_params(0.1));
        let loader = FlightPlanLoader::from_value(empty_plan()).unwrap();
        sim.load(&loader);
        sim.spawn_standard_agents().unwrap();

        let outcome = sim.run();
        assert_eq!(outcome.steps, 10);
        assert!(!outcome.deadlock());
        assert!(sim.sds().is_simulation_over());
        // Every worker released its registration.
        assert!(sim.sds().registry().is_empty());
    }

    #[test]
    fn test_standard_agents_publish_initial_sources() {
        let mut sim = Simulation::new(&fast_params(0.05));
        let loader = FlightPlanLoader::from_value(empty_plan()).unwrap();
        sim.load(&loader);
        sim.spawn_standard_agents().unwrap();

        // Before the clock runs, the initial passes have stamped their
        // cells.
        assert_eq!(
            sim.sds().net_force().data_source,
            "flight_dynamics_agent_initial"
        );
        assert_eq!(
            sim.sds().system_state().data_source,
            "aircraft_system_agent_initial"
        );
        assert_eq!(sim.sds().pilot_state().data_source, "pilot_agent_initial");

        sim.run();
    }
}
