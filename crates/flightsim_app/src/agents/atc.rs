//! ATC agent.
//!
//! Executes the controllers named by routed `ATC_command` events through
//! the strategy selected for the scenario's ATC id, falling back to the
//! standard strategy when the selected one declines a controller.

use tracing::warn;

use flightsim_agent::{AgentBehavior, AgentContext};
use flightsim_data::queues::AgentEventItem;

use crate::strategy::{AtcStrategy, StandardAtcStrategy, atc_strategy_for};

/// The ATC worker behavior.
pub struct AtcAgent {
    strategy: Box<dyn AtcStrategy>,
    fallback: StandardAtcStrategy,
}

impl AtcAgent {
    #[must_use]
    pub fn new(atc_id: &str) -> Self {
        Self {
            strategy: atc_strategy_for(atc_id),
            fallback: StandardAtcStrategy,
        }
    }

    /// The id of the active strategy.
    #[must_use]
    pub fn strategy_id(&self) -> &str {
        self.strategy.strategy_id()
    }
}

impl AgentBehavior for AtcAgent {
    /// The ATC writes `atc_command` only through controllers; there is no
    /// per-step recompute.
    fn update(&mut self, _ctx: &AgentContext) {}

    fn handle_event(&mut self, ctx: &AgentContext, item: &AgentEventItem) {
        if item.controller_type != "ATC_command" {
            warn!(
                event = item.event.name,
                controller_type = item.controller_type,
                "ATC agent received a foreign controller type"
            );
            return;
        }

        let executed = self
            .strategy
            .execute(ctx, &item.controller_name, &item.parameters)
            || self
                .fallback
                .execute(ctx, &item.controller_name, &item.parameters);
        if !executed {
            warn!(
                event = item.event.name,
                controller = item.controller_name,
                strategy = self.strategy.strategy_id(),
                "no ATC controller handled the event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use flightsim_data::{SharedDataSpace, StandardEvent};

    use super::*;

    fn make_ctx(sds: &Arc<SharedDataSpace>) -> AgentContext {
        AgentContext::for_step(sds.clone(), "ATC_001", 1)
    }

    fn atc_event(controller_name: &str) -> AgentEventItem {
        AgentEventItem {
            event: StandardEvent::default(),
            trigger_time: 0.01,
            controller_type: "ATC_command".to_string(),
            controller_name: controller_name.to_string(),
            parameters: HashMap::new(),
        }
    }

    #[test]
    fn test_clearance_event_sets_flag() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let mut atc = AtcAgent::new("ATC_001");
        atc.handle_event(&make_ctx(&sds), &atc_event("clearance_controller"));
        assert!(sds.atc_command().value.clearance_granted);
    }

    #[test]
    fn test_emergency_brake_event_sets_flag() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let mut atc = AtcAgent::new("ATC_001");
        atc.handle_event(&make_ctx(&sds), &atc_event("Emergency_Brake_Command"));
        let command = sds.atc_command().value;
        assert!(command.emergency_brake);
        assert!(!command.clearance_granted);
    }

    #[test]
    fn test_extended_strategy_selected_by_id() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let mut atc = AtcAgent::new("ATC_002");
        assert_eq!(atc.strategy_id(), "ATC_002");
        atc.handle_event(&make_ctx(&sds), &atc_event("issue_takeoff_clearance"));
        assert!(sds.atc_command().value.takeoff_cleared);
    }

    #[test]
    fn test_unknown_controller_changes_nothing() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        let before = sds.atc_command();
        let mut atc = AtcAgent::new("ATC_001");
        atc.handle_event(&make_ctx(&sds), &atc_event("no_such_controller"));
        assert_eq!(sds.atc_command(), before);
    }
}
