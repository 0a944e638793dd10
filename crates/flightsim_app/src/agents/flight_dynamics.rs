//! Flight-dynamics agent.
//!
//! Thin wrapper around the pluggable [`DynamicsModel`]: reads the system
//! and environment cells, advances the model one step, publishes the new
//! kinematics and the 6-DOF resultant. The step-0 pass hands the loader's
//! initial kinematics to the model and publishes the derived initial
//! forces. Per-step model wall time is sampled for the performance report.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use flightsim_agent::{AgentBehavior, AgentContext, DynamicsModel};

use crate::dynamics::GroundRollModel;
use crate::perf::StepTiming;

const SOURCE: &str = "flight_dynamics_agent";

/// The flight-dynamics worker behavior.
pub struct FlightDynamicsAgent {
    model: Box<dyn DynamicsModel>,
    timing: Arc<Mutex<StepTiming>>,
}

impl FlightDynamicsAgent {
    /// Wrap a dynamics model.
    #[must_use]
    pub fn new(model: Box<dyn DynamicsModel>) -> Self {
        Self {
            model,
            timing: Arc::new(Mutex::new(StepTiming::default())),
        }
    }

    /// The default ground-roll model.
    #[must_use]
    pub fn with_default_model() -> Self {
        Self::new(Box::new(GroundRollModel::default()))
    }

    /// Shared handle to the per-step timing sample.
    #[must_use]
    pub fn timing_handle(&self) -> Arc<Mutex<StepTiming>> {
        self.timing.clone()
    }
}

impl AgentBehavior for FlightDynamicsAgent {
    fn initial_update(&mut self, ctx: &AgentContext) {
        let flight = ctx.sds().flight_state().value;
        self.model.initialize(&flight);
        ctx.sds()
            .set_net_force(self.model.current_forces(), &ctx.source_tag(SOURCE));
    }

    fn update(&mut self, ctx: &AgentContext) {
        let sds = ctx.sds();
        let system = sds.system_state().value;
        let environment = sds.environment_state().value;

        let started = Instant::now();
        let new_state = self.model.step(ctx.dt, &system, &environment);
        self.timing
            .lock()
            .expect("timing sample poisoned")
            .record(started.elapsed());

        sds.set_flight_state(new_state, &ctx.source_tag(SOURCE));
        sds.set_net_force(self.model.current_forces(), &ctx.source_tag(SOURCE));
    }
}

#[cfg(test)]
mod tests {
    use flightsim_data::SharedDataSpace;
    use flightsim_data::state::{AircraftFlightState, AircraftSystemState};

    use super::*;

    fn make_sds() -> Arc<SharedDataSpace> {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        sds.set_flight_state(
            AircraftFlightState {
                groundspeed: 2.0,
                heading: 90.0,
                ..AircraftFlightState::default()
            },
            "flight_plan_loader",
        );
        sds.set_system_state(
            AircraftSystemState {
                mass: 70_000.0,
                throttle_position: 0.5,
                landing_gear_deployed: 1.0,
                ..AircraftSystemState::default()
            },
            "flight_plan_loader",
        );
        sds
    }

    #[test]
    fn test_initial_update_publishes_forces() {
        let sds = make_sds();
        let mut agent = FlightDynamicsAgent::with_default_model();
        agent.initial_update(&AgentContext::initial(sds.clone(), "FlightDynamics_001"));
        let forces = sds.net_force();
        assert_eq!(forces.data_source, "flight_dynamics_agent_initial");
    }

    #[test]
    fn test_update_publishes_state_and_forces() {
        let sds = make_sds();
        let mut agent = FlightDynamicsAgent::with_default_model();
        agent.initial_update(&AgentContext::initial(sds.clone(), "FlightDynamics_001"));

        agent.update(&AgentContext::for_step(sds.clone(), "FlightDynamics_001", 1));

        let flight = sds.flight_state();
        assert_eq!(flight.data_source, "flight_dynamics_agent");
        assert!(flight.value.groundspeed > 0.0);
        assert!(sds.net_force().value.force.x.abs() > 0.0);
        assert_eq!(agent.timing_handle().lock().unwrap().samples(), 1);
    }
}
