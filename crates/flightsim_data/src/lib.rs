//! # flightsim_data
//!
//! The shared data space (SDS) for the flight simulation framework. This
//! crate is the single in-process hub every component holds a reference to:
//!
//! - [`cell`] — versioned, independently locked state cells.
//! - [`state`] — the cell payload types (flight state, system state, …).
//! - [`events`] — planned events and the step-indexed triggered library.
//! - [`queues`] — the global event queue and per-agent event queues.
//! - [`registry`] — the worker-thread registry and per-step state machine.
//! - [`sync`] — the step-ready edge, participant snapshot, and run flags.
//! - [`plan`] — stored flight-plan data and the planned-controller library.
//! - [`recorder`] — the per-step snapshot frame and recorder sink trait.
//! - [`space`] — [`SharedDataSpace`], the hub tying it all together.
//!
//! Every operation on the SDS is total: missing data reads as a zeroed
//! default stamped `"uninitialized"`, empty dequeues return `None`, and
//! registry operations report success as booleans. No errors cross this
//! boundary.

pub mod cell;
pub mod events;
pub mod plan;
pub mod queues;
pub mod recorder;
pub mod registry;
pub mod state;
pub mod sync;

mod space;

pub use cell::{StateCell, Stamped, UNINITIALIZED_SOURCE};
pub use events::{
    DrivenProcess, PlannedEventLibrary, StandardEvent, TriggerCondition, TriggeredEventLibrary,
};
pub use plan::{FlightPlanData, PlannedController, PlannedControllersLibrary, ScenarioConfig};
pub use queues::{AgentEventItem, AgentEventQueues, EventQueueItem, GlobalEventQueue};
pub use recorder::{RecorderSink, SnapshotFrame};
pub use registry::{ThreadRegistry, WorkerEntry, WorkerKind, WorkerState};
pub use space::SharedDataSpace;
pub use sync::{RunFlags, StepSync, SyncSignal};
