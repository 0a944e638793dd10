//! Dynamics-model plugin interface.
//!
//! The flight-dynamics agent delegates the actual force and kinematics math
//! to a pluggable model; the core only moves the resulting state through the
//! shared data space.

use flightsim_data::state::{AircraftFlightState, AircraftSystemState, EnvironmentState};
use flightsim_math::ForceMoment;

/// A pluggable flight-dynamics model.
pub trait DynamicsModel: Send {
    /// Take over the initial kinematic state.
    fn initialize(&mut self, state: &AircraftFlightState);

    /// Advance the model by `dt` seconds against the current system and
    /// environment state, returning the new kinematics snapshot.
    fn step(
        &mut self,
        dt: f64,
        system: &AircraftSystemState,
        environment: &EnvironmentState,
    ) -> AircraftFlightState;

    /// The 6-DOF resultant computed by the most recent step.
    fn current_forces(&self) -> ForceMoment;
}
