//! Event dispatcher.
//!
//! Once per step the dispatcher drains the global event queue and routes
//! each item into the queue of the agent owning the event's controller
//! type. The controller-type → agent-id mapping is built at startup from
//! the scenario configuration. Unknown controller types are logged and
//! dropped; the event stays in the triggered library for observability.
//!
//! The dispatcher is an ordinary worker thread; it runs after the monitor
//! and before the agents in the per-step pipeline.

use std::collections::HashMap;

use tracing::{debug, warn};

use flightsim_agent::{AgentBehavior, AgentContext};
use flightsim_data::ScenarioConfig;
use flightsim_data::queues::EventQueueItem;

/// Worker id of the environment agent, which has no scenario-assigned id.
pub const ENVIRONMENT_AGENT_ID: &str = "Environment_001";

/// The event dispatcher worker behavior.
#[derive(Debug)]
pub struct EventDispatcher {
    mapping: HashMap<String, String>,
}

impl EventDispatcher {
    /// Build the controller-type → agent-id mapping from the scenario
    /// configuration.
    #[must_use]
    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        let mut mapping = HashMap::new();
        mapping.insert("ATC_command".to_string(), scenario.atc_id.clone());
        mapping.insert("Pilot_Manual_Control".to_string(), scenario.pilot_id.clone());
        mapping.insert(
            "Pilot_Flight_Task_Control".to_string(),
            scenario.pilot_id.clone(),
        );
        mapping.insert("Aircraft_AutoPilot".to_string(), scenario.aircraft_id.clone());
        mapping.insert(
            "Aircraft_System_State_Shift".to_string(),
            scenario.aircraft_id.clone(),
        );
        mapping.insert(
            "Environment_State_Shift".to_string(),
            ENVIRONMENT_AGENT_ID.to_string(),
        );
        debug!(?mapping, "controller-to-agent mapping built");
        Self { mapping }
    }

    /// The agent that owns a controller type, if the type is known.
    #[must_use]
    pub fn agent_for(&self, controller_type: &str) -> Option<&str> {
        self.mapping.get(controller_type).map(String::as_str)
    }

    fn route(&self, ctx: &AgentContext, item: EventQueueItem) {
        let controller_type = item.event.driven_process.controller_type.clone();
        let controller_name = item.event.driven_process.controller_name.clone();

        match self.agent_for(&controller_type) {
            Some(agent_id) => {
                debug!(
                    step = ctx.step,
                    event = item.event.name,
                    agent = agent_id,
                    controller = format!("{controller_type}::{controller_name}"),
                    "event routed"
                );
                ctx.sds().create_agent_queue(agent_id);
                ctx.sds().enqueue_agent_event(
                    agent_id,
                    item.event,
                    item.trigger_time,
                    &controller_type,
                    &controller_name,
                    HashMap::new(),
                );
            }
            None => {
                warn!(
                    step = ctx.step,
                    event = item.event.name,
                    controller_type,
                    "unknown controller type; event dropped"
                );
            }
        }
    }
}

impl AgentBehavior for EventDispatcher {
    /// Nothing is queued before the first work step.
    fn initial_update(&mut self, _ctx: &AgentContext) {}

    fn update(&mut self, ctx: &AgentContext) {
        let mut routed = 0usize;
        while let Some(item) = ctx.sds().dequeue_event() {
            self.route(ctx, item);
            routed += 1;
        }
        if routed > 0 {
            debug!(step = ctx.step, routed, "dispatcher drained global queue");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flightsim_data::{DrivenProcess, SharedDataSpace, StandardEvent};

    use super::*;

    fn make_event(id: u64, controller_type: &str, controller_name: &str) -> StandardEvent {
        StandardEvent {
            id,
            name: format!("event_{id}"),
            driven_process: DrivenProcess {
                controller_type: controller_type.to_string(),
                controller_name: controller_name.to_string(),
                ..DrivenProcess::default()
            },
            ..StandardEvent::default()
        }
    }

    fn make_dispatcher() -> EventDispatcher {
        EventDispatcher::from_scenario(&ScenarioConfig::default())
    }

    fn ctx(sds: &Arc<SharedDataSpace>) -> AgentContext {
        AgentContext::for_step(sds.clone(), "event_dispatcher", 1)
    }

    #[test]
    fn test_default_mapping() {
        let dispatcher = make_dispatcher();
        assert_eq!(dispatcher.agent_for("ATC_command"), Some("ATC_001"));
        assert_eq!(dispatcher.agent_for("Pilot_Manual_Control"), Some("Pilot_001"));
        assert_eq!(dispatcher.agent_for("Pilot_Flight_Task_Control"), Some("Pilot_001"));
        assert_eq!(dispatcher.agent_for("Aircraft_AutoPilot"), Some("Aircraft_001"));
        assert_eq!(
            dispatcher.agent_for("Aircraft_System_State_Shift"),
            Some("Aircraft_001")
        );
        assert_eq!(
            dispatcher.agent_for("Environment_State_Shift"),
            Some(ENVIRONMENT_AGENT_ID)
        );
        assert_eq!(dispatcher.agent_for("Mystery"), None);
    }

    #[test]
    fn test_configured_ids_override_defaults() {
        let scenario = ScenarioConfig {
            pilot_id: "Pilot_007".into(),
            atc_id: "ATC_T2".into(),
            ..ScenarioConfig::default()
        };
        let dispatcher = EventDispatcher::from_scenario(&scenario);
        assert_eq!(dispatcher.agent_for("ATC_command"), Some("ATC_T2"));
        assert_eq!(dispatcher.agent_for("Pilot_Manual_Control"), Some("Pilot_007"));
    }

    #[test]
    fn test_routes_to_single_owning_agent() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        sds.enqueue_event(make_event(1, "ATC_command", "clearance_controller"), 0.01, "event_monitor");

        let mut dispatcher = make_dispatcher();
        dispatcher.update(&ctx(&sds));

        assert_eq!(sds.agent_queue_len("ATC_001"), 1);
        assert_eq!(sds.agent_queue_len("Pilot_001"), 0);
        let item = sds.dequeue_agent_event("ATC_001").unwrap();
        assert_eq!(item.controller_name, "clearance_controller");
        assert!(sds.dequeue_event().is_none(), "global queue drained");
    }

    #[test]
    fn test_same_agent_keeps_monitor_order() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        sds.enqueue_event(make_event(1, "Pilot_Manual_Control", "a"), 0.01, "event_monitor");
        sds.enqueue_event(make_event(2, "Pilot_Flight_Task_Control", "b"), 0.01, "event_monitor");

        let mut dispatcher = make_dispatcher();
        dispatcher.update(&ctx(&sds));

        assert_eq!(sds.dequeue_agent_event("Pilot_001").unwrap().event.id, 1);
        assert_eq!(sds.dequeue_agent_event("Pilot_001").unwrap().event.id, 2);
    }

    #[test]
    fn test_unknown_controller_type_dropped() {
        let sds = Arc::new(SharedDataSpace::new(0.01));
        sds.add_event_to_step(1, make_event(9, "Mystery", "whatever"));
        sds.enqueue_event(make_event(9, "Mystery", "whatever"), 0.01, "event_monitor");

        let mut dispatcher = make_dispatcher();
        dispatcher.update(&ctx(&sds));

        for agent in ["ATC_001", "Pilot_001", "Aircraft_001", ENVIRONMENT_AGENT_ID] {
            assert_eq!(sds.agent_queue_len(agent), 0);
        }
        // The event stays visible in the triggered library.
        assert_eq!(sds.events_at_step(1).len(), 1);
    }
}
