//! Worker-thread registry.
//!
//! Every worker thread registers itself under a unique id before taking part
//! in the step barrier. The registry tracks the per-step state machine
//! (WAITING_FOR_CLOCK → RUNNING → COMPLETED) and the last step each worker
//! processed, which is what the clock inspects when closing the barrier.

use dashmap::DashMap;

/// The kind of worker behind a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerKind {
    Environment,
    AircraftSystem,
    FlightDynamics,
    Pilot,
    Atc,
    EventMonitor,
    EventDispatcher,
    /// Anything else (test fixtures, auxiliary workers).
    Custom(String),
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::AircraftSystem => write!(f, "aircraft_system"),
            Self::FlightDynamics => write!(f, "flight_dynamics"),
            Self::Pilot => write!(f, "pilot"),
            Self::Atc => write!(f, "atc"),
            Self::EventMonitor => write!(f, "event_monitor"),
            Self::EventDispatcher => write!(f, "event_dispatcher"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Per-step worker state observed by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    WaitingForClock,
    Running,
    Completed,
}

/// One registered worker.
#[derive(Debug, Clone)]
pub struct WorkerEntry {
    /// Human-readable worker name.
    pub name: String,
    /// Worker kind.
    pub kind: WorkerKind,
    /// Current barrier state.
    pub state: WorkerState,
    /// The step this worker most recently started processing, if any.
    pub last_step: Option<u64>,
}

/// Registry of all worker threads, keyed by worker id.
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    workers: DashMap<String, WorkerEntry>,
}

impl ThreadRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workers: DashMap::new(),
        }
    }

    /// Register a worker. Returns `false` if the id is already taken; the
    /// late claimant must not participate.
    pub fn register(&self, id: &str, name: &str, kind: WorkerKind) -> bool {
        let mut taken = false;
        self.workers
            .entry(id.to_string())
            .and_modify(|_| taken = true)
            .or_insert_with(|| WorkerEntry {
                name: name.to_string(),
                kind,
                state: WorkerState::WaitingForClock,
                last_step: None,
            });
        !taken
    }

    /// Remove a worker registration. Returns `true` if it existed.
    pub fn unregister(&self, id: &str) -> bool {
        self.workers.remove(id).is_some()
    }

    /// Returns a snapshot of one worker's entry.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<WorkerEntry> {
        self.workers.get(id).map(|e| e.clone())
    }

    /// Mark a worker as waiting for the next step edge.
    pub fn set_waiting(&self, id: &str) {
        if let Some(mut entry) = self.workers.get_mut(id) {
            entry.state = WorkerState::WaitingForClock;
        }
    }

    /// Mark a worker as running the given step.
    pub fn begin_step(&self, id: &str, step: u64) {
        if let Some(mut entry) = self.workers.get_mut(id) {
            entry.state = WorkerState::Running;
            entry.last_step = Some(step);
        }
    }

    /// Mark a worker as having completed its current step.
    pub fn complete_step(&self, id: &str) {
        if let Some(mut entry) = self.workers.get_mut(id) {
            entry.state = WorkerState::Completed;
        }
    }

    /// Whether a worker has completed the given step. A worker that has
    /// unregistered counts as completed: it no longer holds the barrier.
    #[must_use]
    pub fn completed_for(&self, id: &str, step: u64) -> bool {
        match self.workers.get(id) {
            Some(entry) => {
                entry.state == WorkerState::Completed && entry.last_step == Some(step)
            }
            None => true,
        }
    }

    /// Ids of all currently registered workers.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.workers.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of registered workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether no workers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
