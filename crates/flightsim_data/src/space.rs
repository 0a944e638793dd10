//! The shared data space.
//!
//! [`SharedDataSpace`] is the single process-wide hub. Every cell, queue and
//! library inside it is locked independently; no operation holds more than
//! one lock, and no lock is held across a call into another component. There
//! is deliberately no cross-cell atomicity — a component needing a coherent
//! multi-cell view reads the cells in a defined order and tolerates skew
//! within one step, which the barrier bounds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use flightsim_math::ForceMoment;
use tracing::debug;

use crate::cell::{Stamped, StateCell};
use crate::events::{PlannedEventLibrary, StandardEvent, TriggeredEventLibrary};
use crate::plan::{FlightPlanData, PlannedControllersLibrary};
use crate::queues::{AgentEventItem, AgentEventQueues, EventQueueItem, GlobalEventQueue};
use crate::recorder::{RecorderSink, SnapshotFrame};
use crate::registry::{ThreadRegistry, WorkerKind};
use crate::state::{
    AircraftFlightState, AircraftSystemState, AtcCommand, ControllerExecutionStatus,
    EnvironmentState, FinalControlCommand, PilotState,
};
use crate::sync::{RunFlags, StepSync, SyncSignal};

/// The process-wide shared data space.
pub struct SharedDataSpace {
    time_step: f64,

    flags: RunFlags,
    sync: StepSync,
    registry: ThreadRegistry,

    planned_events: PlannedEventLibrary,
    triggered_events: TriggeredEventLibrary,
    global_queue: GlobalEventQueue,
    agent_queues: AgentEventQueues,

    flight_state: StateCell<AircraftFlightState>,
    system_state: StateCell<AircraftSystemState>,
    net_force: StateCell<ForceMoment>,
    environment: StateCell<EnvironmentState>,
    pilot: StateCell<PilotState>,
    atc_command: StateCell<AtcCommand>,
    final_control: StateCell<FinalControlCommand>,
    controller_status: StateCell<ControllerExecutionStatus>,
    flight_plan: StateCell<FlightPlanData>,
    planned_controllers: StateCell<PlannedControllersLibrary>,

    recorder: Mutex<Option<Arc<dyn RecorderSink>>>,
}

impl SharedDataSpace {
    /// Create a data space for a simulation with the given fixed time step.
    #[must_use]
    pub fn new(time_step: f64) -> Self {
        Self {
            time_step,
            flags: RunFlags::new(),
            sync: StepSync::new(),
            registry: ThreadRegistry::new(),
            planned_events: PlannedEventLibrary::new(),
            triggered_events: TriggeredEventLibrary::new(),
            global_queue: GlobalEventQueue::new(),
            agent_queues: AgentEventQueues::new(),
            flight_state: StateCell::new(),
            system_state: StateCell::new(),
            net_force: StateCell::new(),
            environment: StateCell::new(),
            pilot: StateCell::new(),
            atc_command: StateCell::new(),
            final_control: StateCell::new(),
            controller_status: StateCell::new(),
            flight_plan: StateCell::new(),
            planned_controllers: StateCell::new(),
            recorder: Mutex::new(None),
        }
    }

    /// The fixed simulation time step in seconds.
    #[must_use]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Authoritative simulation time: the published step times the step
    /// size. Never derived from the wall clock.
    #[must_use]
    pub fn current_sim_time(&self) -> f64 {
        self.sync.signal().current_step as f64 * self.time_step
    }

    // ── Run flags ───────────────────────────────────────────────────────────

    pub fn set_running(&self, running: bool) {
        self.flags.set_running(running);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.flags.is_running()
    }

    /// Raise the shutdown cue observed by every polling loop.
    pub fn mark_simulation_over(&self) {
        self.flags.mark_over();
    }

    #[must_use]
    pub fn is_simulation_over(&self) -> bool {
        self.flags.is_over()
    }

    // ── Thread registry ─────────────────────────────────────────────────────

    /// Register a worker thread. Returns `false` on an id conflict.
    pub fn register_thread(&self, id: &str, name: &str, kind: WorkerKind) -> bool {
        self.registry.register(id, name, kind)
    }

    pub fn unregister_thread(&self, id: &str) -> bool {
        self.registry.unregister(id)
    }

    /// Direct access to the registry (state transitions, inspection).
    #[must_use]
    pub fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }

    // ── Step synchronization ────────────────────────────────────────────────

    /// Raise the step edge. The set of workers registered right now becomes
    /// the participant set the clock waits for; later registrations join at
    /// the next publish.
    pub fn publish_step_ready(&self, step: u64) {
        self.sync.publish_step_ready(step, self.registry.ids());
    }

    pub fn clear_step_ready(&self) {
        self.sync.clear_step_ready();
    }

    #[must_use]
    pub fn sync_signal(&self) -> SyncSignal {
        self.sync.signal()
    }

    /// The participant snapshot taken at the most recent publish.
    #[must_use]
    pub fn participants(&self) -> Vec<String> {
        self.sync.participants()
    }

    /// Whether every participant of the current publish has completed the
    /// given step. Workers that unregistered meanwhile no longer hold the
    /// barrier.
    #[must_use]
    pub fn all_participants_completed(&self, step: u64) -> bool {
        self.sync
            .participants()
            .iter()
            .all(|id| self.registry.completed_for(id, step))
    }

    /// How many of the current participants have completed the given step.
    #[must_use]
    pub fn participants_completed_count(&self, step: u64) -> usize {
        self.sync
            .participants()
            .iter()
            .filter(|id| self.registry.completed_for(id, step))
            .count()
    }

    // ── Event libraries ─────────────────────────────────────────────────────

    /// Append a planned event; returns `false` on a duplicate id.
    pub fn add_planned_event(&self, event: StandardEvent) -> bool {
        self.planned_events.add(event)
    }

    #[must_use]
    pub fn planned_events(&self) -> Vec<StandardEvent> {
        self.planned_events.events()
    }

    /// Record a trigger at `step`; returns `false` if already recorded there.
    pub fn add_event_to_step(&self, step: u64, event: StandardEvent) -> bool {
        self.triggered_events.add_at_step(step, event)
    }

    #[must_use]
    pub fn events_at_step(&self, step: u64) -> Vec<StandardEvent> {
        self.triggered_events.events_at_step(step)
    }

    /// The triggered library for point/window inspection.
    #[must_use]
    pub fn triggered_events(&self) -> &TriggeredEventLibrary {
        &self.triggered_events
    }

    // ── Event queues ────────────────────────────────────────────────────────

    pub fn enqueue_event(&self, event: StandardEvent, trigger_time: f64, source: &str) {
        self.global_queue.enqueue(event, trigger_time, source);
    }

    #[must_use]
    pub fn dequeue_event(&self) -> Option<EventQueueItem> {
        self.global_queue.dequeue()
    }

    /// Ensure an agent queue exists. Idempotent.
    pub fn create_agent_queue(&self, agent_id: &str) {
        self.agent_queues.create(agent_id);
    }

    pub fn enqueue_agent_event(
        &self,
        agent_id: &str,
        event: StandardEvent,
        trigger_time: f64,
        controller_type: &str,
        controller_name: &str,
        parameters: HashMap<String, String>,
    ) {
        self.agent_queues.enqueue(
            agent_id,
            AgentEventItem {
                event,
                trigger_time,
                controller_type: controller_type.to_string(),
                controller_name: controller_name.to_string(),
                parameters,
            },
        );
    }

    #[must_use]
    pub fn dequeue_agent_event(&self, agent_id: &str) -> Option<AgentEventItem> {
        self.agent_queues.dequeue(agent_id)
    }

    #[must_use]
    pub fn agent_queue_len(&self, agent_id: &str) -> usize {
        self.agent_queues.len(agent_id)
    }

    // ── State cells ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn flight_state(&self) -> Stamped<AircraftFlightState> {
        self.flight_state.get()
    }

    pub fn set_flight_state(&self, value: AircraftFlightState, data_source: &str) {
        self.flight_state.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn system_state(&self) -> Stamped<AircraftSystemState> {
        self.system_state.get()
    }

    pub fn set_system_state(&self, value: AircraftSystemState, data_source: &str) {
        self.system_state.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn net_force(&self) -> Stamped<ForceMoment> {
        self.net_force.get()
    }

    pub fn set_net_force(&self, value: ForceMoment, data_source: &str) {
        self.net_force.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn environment_state(&self) -> Stamped<EnvironmentState> {
        self.environment.get()
    }

    pub fn set_environment_state(&self, value: EnvironmentState, data_source: &str) {
        self.environment.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn pilot_state(&self) -> Stamped<PilotState> {
        self.pilot.get()
    }

    pub fn set_pilot_state(&self, value: PilotState, data_source: &str) {
        self.pilot.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn atc_command(&self) -> Stamped<AtcCommand> {
        self.atc_command.get()
    }

    pub fn set_atc_command(&self, value: AtcCommand, data_source: &str) {
        self.atc_command.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn final_control_command(&self) -> Stamped<FinalControlCommand> {
        self.final_control.get()
    }

    pub fn set_final_control_command(&self, value: FinalControlCommand, data_source: &str) {
        self.final_control.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn controller_execution_status(&self) -> Stamped<ControllerExecutionStatus> {
        self.controller_status.get()
    }

    pub fn set_controller_execution_status(
        &self,
        value: ControllerExecutionStatus,
        data_source: &str,
    ) {
        self.controller_status.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn flight_plan_data(&self) -> Stamped<FlightPlanData> {
        self.flight_plan.get()
    }

    pub fn set_flight_plan_data(&self, value: FlightPlanData, data_source: &str) {
        self.flight_plan.set(value, data_source, self.current_sim_time());
    }

    #[must_use]
    pub fn planned_controllers(&self) -> Stamped<PlannedControllersLibrary> {
        self.planned_controllers.get()
    }

    pub fn set_planned_controllers(&self, value: PlannedControllersLibrary, data_source: &str) {
        self.planned_controllers
            .set(value, data_source, self.current_sim_time());
    }

    // ── Data recorder ───────────────────────────────────────────────────────

    /// Attach the recorder sink. At most one sink is active at a time.
    pub fn attach_recorder(&self, sink: Arc<dyn RecorderSink>) {
        *self.recorder.lock().expect("recorder slot poisoned") = Some(sink);
    }

    /// Assemble a snapshot of every cell and hand it to the attached sink,
    /// if any. The frame also carries the events triggered at the step the
    /// snapshot closes.
    pub fn publish_to_data_recorder(&self, t: f64) {
        let step = (t / self.time_step).round() as u64;
        let frame = SnapshotFrame {
            t,
            step,
            flight_state: self.flight_state.get(),
            system_state: self.system_state.get(),
            net_force: self.net_force.get(),
            environment: self.environment.get(),
            pilot: self.pilot.get(),
            atc_command: self.atc_command.get(),
            final_control: self.final_control.get(),
            controller_status: self.controller_status.get(),
            planned_controllers: self.planned_controllers.get(),
            triggered_events: self.triggered_events.events_at_step(step),
        };
        let sink = self.recorder.lock().expect("recorder slot poisoned").clone();
        match sink {
            Some(sink) => sink.publish(frame),
            None => debug!(t, "no recorder sink attached; snapshot dropped"),
        }
    }

    /// Flush the attached sink, if any.
    pub fn flush_recorder(&self) {
        if let Some(sink) = self.recorder.lock().expect("recorder slot poisoned").clone() {
            sink.flush();
        }
    }
}

impl std::fmt::Debug for SharedDataSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDataSpace")
            .field("time_step", &self.time_step)
            .field("registered_workers", &self.registry.len())
            .field("planned_events", &self.planned_events.len())
            .field("triggered_events", &self.triggered_events.total())
            .finish_non_exhaustive()
    }
}
