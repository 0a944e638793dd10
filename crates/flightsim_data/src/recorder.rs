//! Data-recorder fan-out.
//!
//! Once per step (and once at step 0) the shared data space assembles a
//! coherent snapshot of every cell and hands it to the attached sink. The
//! sink must not block the caller: file-backed implementations buffer
//! through a channel.

use flightsim_math::ForceMoment;
use serde::{Deserialize, Serialize};

use crate::cell::Stamped;
use crate::events::StandardEvent;
use crate::plan::PlannedControllersLibrary;
use crate::state::{
    AircraftFlightState, AircraftSystemState, AtcCommand, ControllerExecutionStatus,
    EnvironmentState, FinalControlCommand, PilotState,
};

/// A coherent snapshot of all state cells at one simulation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFrame {
    /// Simulation time of the snapshot, `step * time_step`.
    pub t: f64,
    /// The step the snapshot closes.
    pub step: u64,
    pub flight_state: Stamped<AircraftFlightState>,
    pub system_state: Stamped<AircraftSystemState>,
    pub net_force: Stamped<ForceMoment>,
    pub environment: Stamped<EnvironmentState>,
    pub pilot: Stamped<PilotState>,
    pub atc_command: Stamped<AtcCommand>,
    pub final_control: Stamped<FinalControlCommand>,
    pub controller_status: Stamped<ControllerExecutionStatus>,
    pub planned_controllers: Stamped<PlannedControllersLibrary>,
    /// Events recorded as triggered at this step.
    pub triggered_events: Vec<StandardEvent>,
}

/// A sink for per-step snapshots. Implementations must return promptly;
/// anything slow belongs behind a channel.
pub trait RecorderSink: Send + Sync {
    /// Accept one snapshot frame.
    fn publish(&self, frame: SnapshotFrame);

    /// Flush any buffered rows. Called at shutdown.
    fn flush(&self) {}
}
