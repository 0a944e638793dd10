//! Aircraft-system agent.
//!
//! Owns the effector/fuel state. Each step it reads the environment, the
//! flight state, and the merged control target, applies overrides, burns
//! fuel, and publishes `aircraft_system_state`. An ATC emergency brake
//! short-circuits everything: brakes jump to maximum and the throttle
//! target drops to idle in the same step the command is observed.
//!
//! Throttle is the one slow effector: the smoothing tick walks the actual
//! position toward the commanded target at a fixed rate, so a push to
//! maximum shows up as a monotone ramp.

use tracing::{debug, info, warn};

use flightsim_agent::{AgentBehavior, AgentContext};
use flightsim_data::queues::AgentEventItem;

const SOURCE: &str = "aircraft_system_agent";

/// Throttle slew rate in position fraction per second.
const THROTTLE_RATE: f64 = 0.25;
/// Fuel burn at full throttle, kg/s.
const FUEL_BURN_RATE: f64 = 1.2;
/// Brake pressure commanded by an ATC emergency brake, percent.
const EMERGENCY_BRAKE_PRESSURE: f64 = 100.0;

/// The aircraft-system worker behavior.
#[derive(Debug)]
pub struct AircraftSystemAgent {
    throttle_target: f64,
    emergency_latched: bool,
}

impl AircraftSystemAgent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            throttle_target: 0.0,
            emergency_latched: false,
        }
    }
}

impl Default for AircraftSystemAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for AircraftSystemAgent {
    fn initial_update(&mut self, ctx: &AgentContext) {
        // Adopt the loader's throttle as the starting target so the ramp is
        // a no-op until something commands otherwise.
        let state = ctx.sds().system_state().value;
        self.throttle_target = state.throttle_position;
        ctx.sds().set_system_state(state, &ctx.source_tag(SOURCE));
    }

    fn update(&mut self, ctx: &AgentContext) {
        let sds = ctx.sds();
        let mut state = sds.system_state().value;
        let atc = sds.atc_command().value;
        let control = sds.final_control_command().value;

        if atc.emergency_brake {
            state.brake_pressure = EMERGENCY_BRAKE_PRESSURE;
            self.throttle_target = 0.0;
            if !self.emergency_latched {
                self.emergency_latched = true;
                info!(t = ctx.t, "emergency brake engaged; throttle to idle");
            }
        } else if control.active {
            self.throttle_target = control.throttle.clamp(0.0, 1.0);
            state.brake_pressure = control.brake.clamp(0.0, 100.0);
            state.aileron_deflection = control.aileron.clamp(-1.0, 1.0);
            state.elevator_deflection = control.elevator.clamp(-1.0, 1.0);
            state.rudder_deflection = control.rudder.clamp(-1.0, 1.0);
        }

        let burned = state.throttle_position * FUEL_BURN_RATE * ctx.dt;
        let burnable = burned.min(state.fuel);
        state.fuel -= burnable;
        state.mass = (state.mass - burnable).max(0.0);

        sds.set_system_state(state, &ctx.source_tag(SOURCE));
    }

    fn handle_event(&mut self, ctx: &AgentContext, item: &AgentEventItem) {
        match item.controller_type.as_str() {
            "Aircraft_System_State_Shift" | "Aircraft_AutoPilot" => {
                let mut state = ctx.sds().system_state().value;
                let mut applied = false;
                if let Some(throttle) = item
                    .parameters
                    .get("throttle_target")
                    .and_then(|v| v.parse::<f64>().ok())
                {
                    self.throttle_target = throttle.clamp(0.0, 1.0);
                    applied = true;
                }
                if let Some(flaps) = item
                    .parameters
                    .get("flaps")
                    .and_then(|v| v.parse::<f64>().ok())
                {
                    state.flaps_deployed = flaps.clamp(0.0, 1.0);
                    applied = true;
                }
                if let Some(spoilers) = item
                    .parameters
                    .get("spoilers")
                    .and_then(|v| v.parse::<f64>().ok())
                {
                    state.spoilers_deployed = spoilers.clamp(0.0, 1.0);
                    applied = true;
                }

                if applied {
                    debug!(
                        t = ctx.t,
                        event = item.event.name,
                        controller = item.controller_name,
                        "aircraft system shift applied"
                    );
                    ctx.sds().set_system_state(state, &ctx.source_tag(SOURCE));
                } else {
                    warn!(
                        event = item.event.name,
                        controller = item.controller_name,
                        "aircraft system controller carried no recognised parameters"
                    );
                }
            }
            other => {
                warn!(
                    event = item.event.name,
                    controller_type = other,
                    "aircraft system agent received a foreign controller type"
                );
            }
        }
    }

    fn tick_smoothing(&mut self, ctx: &AgentContext) {
        let sds = ctx.sds();
        let mut state = sds.system_state().value;
        let delta = self.throttle_target - state.throttle_position;
        if delta.abs() < f64::EPSILON || ctx.dt == 0.0 {
            return;
        }
        let max_move = THROTTLE_RATE * ctx.dt;
        state.throttle_position += delta.clamp(-max_move, max_move);
        sds.set_system_state(state, &ctx.source_tag(SOURCE));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flightsim_data::SharedDataSpace;
    use flightsim_data::state::{AircraftSystemState, AtcCommand, FinalControlCommand};

    use super::*;

    fn sds_with_system(throttle: f64) -> Arc<SharedDataSpace> {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        sds.set_system_state(
            AircraftSystemState {
                mass: 70_000.0,
                fuel: 10_000.0,
                throttle_position: throttle,
                ..AircraftSystemState::default()
            },
            "flight_plan_loader",
        );
        sds
    }

    fn step(agent: &mut AircraftSystemAgent, sds: &Arc<SharedDataSpace>, step: u64) {
        let ctx = AgentContext::for_step(sds.clone(), "Aircraft_001", step);
        agent.update(&ctx);
        agent.tick_smoothing(&ctx);
    }

    #[test]
    fn test_initial_update_adopts_loader_throttle() {
        let sds = sds_with_system(0.3);
        let mut agent = AircraftSystemAgent::new();
        agent.initial_update(&AgentContext::initial(sds.clone(), "Aircraft_001"));
        assert_eq!(sds.system_state().data_source, "aircraft_system_agent_initial");

        // Without commands the throttle holds position.
        step(&mut agent, &sds, 1);
        assert!((sds.system_state().value.throttle_position - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_throttle_ramps_monotonically_to_command() {
        let sds = sds_with_system(0.3);
        sds.set_final_control_command(
            FinalControlCommand {
                active: true,
                throttle: 1.0,
                ..FinalControlCommand::default()
            },
            "pilot_agent",
        );

        let mut agent = AircraftSystemAgent::new();
        agent.initial_update(&AgentContext::initial(sds.clone(), "Aircraft_001"));

        let mut previous = 0.3;
        for s in 1..=400 {
            step(&mut agent, &sds, s);
            let throttle = sds.system_state().value.throttle_position;
            assert!(throttle >= previous - 1e-12, "ramp must be monotone at step {s}");
            previous = throttle;
        }
        assert!((previous - 1.0).abs() < 1e-9, "ramp must reach the target");
    }

    #[test]
    fn test_emergency_brake_short_circuit() {
        let sds = sds_with_system(0.8);
        sds.set_atc_command(
            AtcCommand {
                emergency_brake: true,
                ..AtcCommand::default()
            },
            "atc_agent",
        );

        let mut agent = AircraftSystemAgent::new();
        agent.initial_update(&AgentContext::initial(sds.clone(), "Aircraft_001"));
        step(&mut agent, &sds, 1);

        let state = sds.system_state().value;
        assert_eq!(state.brake_pressure, EMERGENCY_BRAKE_PRESSURE);
        assert!(state.throttle_position < 0.8, "throttle ramps down toward idle");

        // Emergency overrides an active control command.
        sds.set_final_control_command(
            FinalControlCommand {
                active: true,
                throttle: 1.0,
                ..FinalControlCommand::default()
            },
            "pilot_agent",
        );
        for s in 2..=50 {
            step(&mut agent, &sds, s);
        }
        assert!(sds.system_state().value.throttle_position < 0.8);
    }

    #[test]
    fn test_fuel_burn_tracks_throttle() {
        let sds = sds_with_system(1.0);
        let mut agent = AircraftSystemAgent::new();
        agent.initial_update(&AgentContext::initial(sds.clone(), "Aircraft_001"));
        for s in 1..=100 {
            step(&mut agent, &sds, s);
        }
        let state = sds.system_state().value;
        assert!(state.fuel < 10_000.0);
        assert!(state.mass < 70_000.0);
        assert!((10_000.0 - state.fuel - (70_000.0 - state.mass)).abs() < 1e-9);
    }
}
