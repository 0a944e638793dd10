//! Pilot agent.
//!
//! Drains its event queue and dispatches by controller type: manual-control
//! and flight-task events resolve through the pilot's controller registry.
//! The pilot also watches the ATC command flags directly — an emergency
//! brake gets an immediate max-brake response, and a granted clearance with
//! no delivered manual-control event fabricates a single synthetic
//! throttle push (older scenarios rely on it).

use std::collections::HashMap;

use tracing::{info, warn};

use flightsim_agent::{AgentBehavior, AgentContext, ControllerRegistry};
use flightsim_data::queues::AgentEventItem;

use crate::strategy::pilot_controllers_for;

const SOURCE: &str = "pilot_agent";

/// The pilot worker behavior.
pub struct PilotAgent {
    controllers: ControllerRegistry,
    manual_event_seen: bool,
    synthetic_issued: bool,
    emergency_handled: bool,
}

impl PilotAgent {
    #[must_use]
    pub fn new(pilot_id: &str) -> Self {
        Self {
            controllers: pilot_controllers_for(pilot_id),
            manual_event_seen: false,
            synthetic_issued: false,
            emergency_handled: false,
        }
    }
}

impl AgentBehavior for PilotAgent {
    fn update(&mut self, ctx: &AgentContext) {
        let atc = ctx.sds().atc_command().value;

        if !ctx.initial {
            if atc.emergency_brake && !self.emergency_handled {
                self.emergency_handled = true;
                info!(t = ctx.t, "pilot responding to emergency brake command");
                self.controllers
                    .execute(ctx, "brake_apply_max", &HashMap::new());
            }

            // Compatibility rule: a clearance with no manual-control event
            // delivered yet gets one synthetic throttle push.
            if atc.clearance_granted && !self.manual_event_seen && !self.synthetic_issued {
                self.synthetic_issued = true;
                info!(
                    t = ctx.t,
                    "clearance observed without a manual-control event; fabricating throttle push"
                );
                self.controllers
                    .execute(ctx, "throttle_push2max", &HashMap::new());
            }
        }

        let state = ctx.sds().pilot_state().value;
        ctx.sds().set_pilot_state(state, &ctx.source_tag(SOURCE));
    }

    fn handle_event(&mut self, ctx: &AgentContext, item: &AgentEventItem) {
        match item.controller_type.as_str() {
            "Pilot_Manual_Control" => {
                self.manual_event_seen = true;
                if !self
                    .controllers
                    .execute(ctx, &item.controller_name, &item.parameters)
                {
                    warn!(
                        event = item.event.name,
                        controller = item.controller_name,
                        "pilot manual-control event not handled"
                    );
                }
            }
            "Pilot_Flight_Task_Control" => {
                if !self
                    .controllers
                    .execute(ctx, &item.controller_name, &item.parameters)
                {
                    warn!(
                        event = item.event.name,
                        controller = item.controller_name,
                        "pilot flight-task event not handled"
                    );
                }
            }
            other => {
                warn!(
                    event = item.event.name,
                    controller_type = other,
                    "pilot agent received a foreign controller type"
                );
            }
        }
    }
}
