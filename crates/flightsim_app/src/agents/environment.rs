//! Environment agent.
//!
//! Holds the runway/wind/air state steady and republishes it every step so
//! the cell always carries a fresh stamp. Environment-state-shift events
//! adjust wind and surface conditions through their parameter map.

use tracing::{debug, warn};

use flightsim_agent::{AgentBehavior, AgentContext};
use flightsim_data::queues::AgentEventItem;

const SOURCE: &str = "environment_agent";

/// The environment worker behavior.
#[derive(Debug, Default)]
pub struct EnvironmentAgent;

impl AgentBehavior for EnvironmentAgent {
    fn update(&mut self, ctx: &AgentContext) {
        let state = ctx.sds().environment_state().value;
        ctx.sds().set_environment_state(state, &ctx.source_tag(SOURCE));
    }

    fn handle_event(&mut self, ctx: &AgentContext, item: &AgentEventItem) {
        if item.controller_type != "Environment_State_Shift" {
            warn!(
                event = item.event.name,
                controller_type = item.controller_type,
                "environment agent received a foreign controller type"
            );
            return;
        }

        let mut state = ctx.sds().environment_state().value;
        let mut applied = false;
        if let Some(speed) = item.parameters.get("wind_speed").and_then(|v| v.parse().ok()) {
            state.wind_speed = speed;
            applied = true;
        }
        if let Some(direction) = item
            .parameters
            .get("wind_direction")
            .and_then(|v| v.parse().ok())
        {
            state.wind_direction = direction;
            applied = true;
        }
        if let Some(friction) = item
            .parameters
            .get("friction_coefficient")
            .and_then(|v| v.parse().ok())
        {
            state.friction_coefficient = friction;
            applied = true;
        }

        if applied {
            debug!(
                t = ctx.t,
                event = item.event.name,
                "environment state shift applied"
            );
            ctx.sds().set_environment_state(state, &ctx.source_tag(SOURCE));
        } else {
            warn!(
                event = item.event.name,
                controller = item.controller_name,
                "environment state shift carried no recognised parameters"
            );
        }
    }
}
