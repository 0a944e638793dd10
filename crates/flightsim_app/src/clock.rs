//! Simulation clock.
//!
//! The clock is the sole writer of the step-ready edge. One step:
//!
//! 1. Increment the step counter (the first work step is 1; step 0 is the
//!    agents' initial pass).
//! 2. Publish the edge; the workers registered at publish time become the
//!    participants of this step.
//! 3. Poll until every participant is COMPLETED for this step.
//! 4. Clear the edge, refresh the controller-execution status, publish the
//!    step snapshot to the data recorder.
//! 5. Pace against the wall clock if a time scale is set.
//!
//! Simulation time is always `step * time_step` — the wall clock only paces
//! playback, it never defines `t`. If no participant makes progress for the
//! deadlock window the clock logs a fatal condition, raises `over`, and
//! reports [`RunOutcome::DeadlockSuspected`].

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use flightsim_data::SharedDataSpace;
use flightsim_data::state::ControllerExecutionStatus;

/// Configuration for the clock.
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Fixed step size in seconds.
    pub time_step: f64,
    /// Wall-clock pacing factor; 0 means "as fast as possible".
    pub time_scale: f64,
    /// Termination bound in seconds.
    pub max_simulation_time: f64,
    /// How long the barrier may make no progress before the clock declares
    /// a deadlock.
    pub deadlock_window: Duration,
    /// Sleep between barrier polls.
    pub poll_interval: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            time_scale: 1.0,
            max_simulation_time: 300.0,
            deadlock_window: Duration::from_secs(10),
            poll_interval: Duration::from_micros(200),
        }
    }
}

/// Clock lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
    Finished,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The simulation reached its time bound.
    Completed { steps: u64 },
    /// The barrier made no progress for the deadlock window.
    DeadlockSuspected { step: u64 },
    /// `over` was raised externally while the clock was waiting.
    Aborted { step: u64 },
}

enum BarrierWait {
    Closed,
    Aborted,
    Deadlocked,
}

/// The fixed-step driver.
#[derive(Debug)]
pub struct SimulationClock {
    config: ClockConfig,
    sds: Arc<SharedDataSpace>,
    state: ClockState,
    step: u64,
}

impl SimulationClock {
    #[must_use]
    pub fn new(config: ClockConfig, sds: Arc<SharedDataSpace>) -> Self {
        Self {
            config,
            sds,
            state: ClockState::Stopped,
            step: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// The last step the clock advanced past.
    #[must_use]
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Authoritative simulation time, derived from the integer step.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.step as f64 * self.config.time_step
    }

    /// Mark the clock running and raise the run flag.
    pub fn start(&mut self) {
        self.state = ClockState::Running;
        self.sds.set_running(true);
        info!(
            time_step = self.config.time_step,
            time_scale = self.config.time_scale,
            max_simulation_time = self.config.max_simulation_time,
            "simulation clock started"
        );
    }

    /// Run until the time bound, a deadlock, or an external shutdown.
    pub fn run(&mut self) -> RunOutcome {
        if self.state != ClockState::Running {
            self.start();
        }

        // Half a step of slack so float accumulation in the bound check
        // cannot add or drop a step.
        let epsilon = self.config.time_step / 2.0;
        let outcome = loop {
            if self.current_time() >= self.config.max_simulation_time - epsilon {
                break RunOutcome::Completed { steps: self.step };
            }
            let tick_start = Instant::now();
            match self.advance_step() {
                BarrierWait::Closed => {}
                BarrierWait::Aborted => break RunOutcome::Aborted { step: self.step },
                BarrierWait::Deadlocked => {
                    break RunOutcome::DeadlockSuspected { step: self.step };
                }
            }
            self.pace(tick_start);
        };

        self.finish(outcome);
        outcome
    }

    /// Advance one step: publish the edge, wait for the barrier, close the
    /// step.
    fn advance_step(&mut self) -> BarrierWait {
        self.step += 1;
        self.sds.publish_step_ready(self.step);
        debug!(
            step = self.step,
            participants = self.sds.participants().len(),
            "step edge raised"
        );

        let wait = self.wait_for_barrier();
        self.sds.clear_step_ready();

        if let BarrierWait::Closed = wait {
            self.update_controller_status();
            self.sds.publish_to_data_recorder(self.current_time());
        }
        wait
    }

    fn wait_for_barrier(&self) -> BarrierWait {
        let mut completed = self.sds.participants_completed_count(self.step);
        let mut last_progress = Instant::now();

        loop {
            if self.sds.all_participants_completed(self.step) {
                return BarrierWait::Closed;
            }
            if self.sds.is_simulation_over() {
                return BarrierWait::Aborted;
            }

            let now_completed = self.sds.participants_completed_count(self.step);
            if now_completed != completed {
                completed = now_completed;
                last_progress = Instant::now();
            }
            if last_progress.elapsed() >= self.config.deadlock_window {
                let stalled: Vec<String> = self
                    .sds
                    .participants()
                    .into_iter()
                    .filter(|id| !self.sds.registry().completed_for(id, self.step))
                    .collect();
                error!(
                    step = self.step,
                    stalled = ?stalled,
                    window_ms = self.config.deadlock_window.as_millis() as u64,
                    "barrier made no progress; deadlock suspected"
                );
                return BarrierWait::Deadlocked;
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// A planned controller is "running" when the event that drives it has
    /// fired. Refreshed after every barrier close.
    fn update_controller_status(&self) {
        let controllers = self.sds.planned_controllers().value;
        if controllers.is_empty() {
            return;
        }
        let triggered = self.sds.triggered_events().triggered_names();
        let mut status = ControllerExecutionStatus::default();
        for controller in controllers.all() {
            let running = triggered.iter().any(|name| *name == controller.event_name);
            status.set_status(&controller.controller_name, running);
        }
        self.sds.set_controller_execution_status(status, "main_thread");
    }

    fn pace(&self, tick_start: Instant) {
        if self.config.time_scale <= 0.0 {
            return;
        }
        let target = Duration::from_secs_f64(self.config.time_step / self.config.time_scale);
        let elapsed = tick_start.elapsed();
        if elapsed < target {
            thread::sleep(target - elapsed);
        }
    }

    fn finish(&mut self, outcome: RunOutcome) {
        self.state = ClockState::Finished;
        self.sds.mark_simulation_over();
        // One final falling transition so edge-waiters cannot hang.
        self.sds.clear_step_ready();
        info!(
            steps = self.step,
            sim_time = self.current_time(),
            ?outcome,
            "simulation clock finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use flightsim_data::recorder::{RecorderSink, SnapshotFrame};
    use flightsim_data::{PlannedController, PlannedControllersLibrary, WorkerKind};

    use super::*;

    struct Counting {
        frames: AtomicUsize,
        times: Mutex<Vec<f64>>,
    }

    impl Counting {
        fn new() -> Self {
            Self {
                frames: AtomicUsize::new(0),
                times: Mutex::new(Vec::new()),
            }
        }
    }

    impl RecorderSink for Counting {
        fn publish(&self, frame: SnapshotFrame) {
            self.frames.fetch_add(1, Ordering::SeqCst);
            self.times.lock().unwrap().push(frame.t);
        }
    }

    fn fast_config(max_simulation_time: f64) -> ClockConfig {
        ClockConfig {
            time_step: 0.01,
            time_scale: 0.0,
            max_simulation_time,
            deadlock_window: Duration::from_millis(200),
            poll_interval: Duration::from_micros(100),
        }
    }

    #[test]
    fn test_step_count_matches_time_bound() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let mut clock = SimulationClock::new(fast_config(0.05), sds);
        let outcome = clock.run();
        assert_eq!(outcome, RunOutcome::Completed { steps: 5 });
        assert_eq!(clock.state(), ClockState::Finished);
        assert!((clock.current_time() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_recorder_gets_one_frame_per_step() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let sink = Arc::new(Counting::new());
        sds.attach_recorder(sink.clone());

        let mut clock = SimulationClock::new(fast_config(0.03), sds);
        clock.run();

        assert_eq!(sink.frames.load(Ordering::SeqCst), 3);
        let times = sink.times.lock().unwrap();
        for (i, t) in times.iter().enumerate() {
            let expected = (i as f64 + 1.0) * 0.01;
            assert!((t - expected).abs() < 1e-12, "frame {i} has t={t}");
        }
    }

    #[test]
    fn test_run_sets_over_flag() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let mut clock = SimulationClock::new(fast_config(0.02), sds.clone());
        assert!(!sds.is_simulation_over());
        clock.run();
        assert!(sds.is_simulation_over());
        assert!(!sds.sync_signal().step_ready);
    }

    #[test]
    fn test_stalled_worker_trips_deadlock_detection() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        // A registered worker with no thread behind it never completes.
        sds.register_thread("stalled", "stalled", WorkerKind::Custom("test".into()));

        let mut clock = SimulationClock::new(fast_config(1.0), sds.clone());
        let outcome = clock.run();
        assert_eq!(outcome, RunOutcome::DeadlockSuspected { step: 1 });
        assert!(sds.is_simulation_over());
    }

    #[test]
    fn test_external_shutdown_aborts_wait() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        sds.register_thread("stalled", "stalled", WorkerKind::Custom("test".into()));

        let mut config = fast_config(1.0);
        config.deadlock_window = Duration::from_secs(30);
        let sds_for_shutdown = sds.clone();
        let shutdown = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            sds_for_shutdown.mark_simulation_over();
        });

        let mut clock = SimulationClock::new(config, sds);
        let outcome = clock.run();
        shutdown.join().unwrap();
        assert_eq!(outcome, RunOutcome::Aborted { step: 1 });
    }

    #[test]
    fn test_controller_status_follows_triggered_events() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let mut controllers = PlannedControllersLibrary::default();
        controllers.insert(PlannedController {
            event_name: "taxi_clearance".into(),
            controller_name: "clearance_controller".into(),
            ..PlannedController::default()
        });
        controllers.insert(PlannedController {
            event_name: "brake_hard".into(),
            controller_name: "Emergency_Brake_Command".into(),
            ..PlannedController::default()
        });
        sds.set_planned_controllers(controllers, "test");
        sds.add_event_to_step(
            1,
            flightsim_data::StandardEvent {
                id: 1,
                name: "taxi_clearance".into(),
                ..flightsim_data::StandardEvent::default()
            },
        );

        let mut clock = SimulationClock::new(fast_config(0.02), sds.clone());
        clock.run();

        let status = sds.controller_execution_status();
        assert_eq!(status.data_source, "main_thread");
        assert!(status.value.is_running("clearance_controller"));
        assert!(!status.value.is_running("Emergency_Brake_Command"));
    }
}
