//! # flightsim_app
//!
//! The simulation assembly: everything that turns the shared data space,
//! the worker harness, and a scenario document into a running virtual
//! flight test.
//!
//! - [`clock`] — the fixed-step driver and sole writer of the step edge.
//! - [`trigger`] — the trigger-expression grammar (`||` of atomic predicates).
//! - [`monitor`] — the event monitor worker.
//! - [`dispatcher`] — the event dispatcher worker.
//! - [`agents`] — the five standard agents.
//! - [`strategy`] — ATC/pilot strategy selection by scenario id.
//! - [`dynamics`] — the default ground-roll dynamics model.
//! - [`recorder`] — CSV data-recorder sinks.
//! - [`logging`] — tracing initialisation from the log configuration.
//! - [`perf`] — run performance statistics.
//! - [`sim`] — startup sequencing and the run loop.

pub mod agents;
pub mod clock;
pub mod dispatcher;
pub mod dynamics;
pub mod logging;
pub mod monitor;
pub mod perf;
pub mod recorder;
pub mod sim;
pub mod strategy;
pub mod trigger;

pub use clock::{ClockConfig, ClockState, RunOutcome, SimulationClock};
pub use dispatcher::EventDispatcher;
pub use monitor::{EventMonitor, TriggerStatistics};
pub use sim::{Simulation, SimulationOutcome};
