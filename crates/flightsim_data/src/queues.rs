//! Event queues.
//!
//! The monitor feeds the global FIFO; the dispatcher drains it and fans out
//! into per-agent queues. Each queue owns value copies of its items — the
//! planned library remains the source of truth and is never mutated by
//! queue traffic.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::events::StandardEvent;

/// An item in the global event queue.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQueueItem {
    pub event: StandardEvent,
    /// Simulation time at which the event fired.
    pub trigger_time: f64,
    /// Which component enqueued it.
    pub source: String,
}

/// An item in a per-agent event queue.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEventItem {
    pub event: StandardEvent,
    pub trigger_time: f64,
    pub controller_type: String,
    pub controller_name: String,
    /// Free-form controller parameters.
    pub parameters: HashMap<String, String>,
}

/// The global FIFO of freshly triggered events.
#[derive(Debug, Default)]
pub struct GlobalEventQueue {
    items: Mutex<VecDeque<EventQueueItem>>,
}

impl GlobalEventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, event: StandardEvent, trigger_time: f64, source: &str) {
        self.items
            .lock()
            .expect("global queue poisoned")
            .push_back(EventQueueItem {
                event,
                trigger_time,
                source: source.to_string(),
            });
    }

    /// Nonblocking FIFO pop; `None` when empty.
    #[must_use]
    pub fn dequeue(&self) -> Option<EventQueueItem> {
        self.items.lock().expect("global queue poisoned").pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().expect("global queue poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-agent FIFO queues, keyed by agent id.
#[derive(Debug, Default)]
pub struct AgentEventQueues {
    queues: DashMap<String, VecDeque<AgentEventItem>>,
}

impl AgentEventQueues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a queue exists for the agent. Idempotent.
    pub fn create(&self, agent_id: &str) {
        self.queues.entry(agent_id.to_string()).or_default();
    }

    /// Whether a queue exists for the agent.
    #[must_use]
    pub fn has_queue(&self, agent_id: &str) -> bool {
        self.queues.contains_key(agent_id)
    }

    /// Enqueue an item for the agent, creating the queue if needed.
    pub fn enqueue(&self, agent_id: &str, item: AgentEventItem) {
        self.queues
            .entry(agent_id.to_string())
            .or_default()
            .push_back(item);
    }

    /// Nonblocking FIFO pop for the agent; `None` when empty or absent.
    #[must_use]
    pub fn dequeue(&self, agent_id: &str) -> Option<AgentEventItem> {
        self.queues.get_mut(agent_id)?.pop_front()
    }

    /// Number of queued items for the agent (0 if the queue is absent).
    #[must_use]
    pub fn len(&self, agent_id: &str) -> usize {
        self.queues.get(agent_id).map_or(0, |q| q.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(id: u64) -> StandardEvent {
        StandardEvent {
            id,
            name: format!("event_{id}"),
            ..StandardEvent::default()
        }
    }

    #[test]
    fn test_global_queue_fifo() {
        let queue = GlobalEventQueue::new();
        queue.enqueue(make_event(1), 0.1, "event_monitor");
        queue.enqueue(make_event(2), 0.1, "event_monitor");
        assert_eq!(queue.dequeue().unwrap().event.id, 1);
        assert_eq!(queue.dequeue().unwrap().event.id, 2);
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_agent_queue_create_is_idempotent() {
        let queues = AgentEventQueues::new();
        queues.create("Pilot_001");
        queues.enqueue(
            "Pilot_001",
            AgentEventItem {
                event: make_event(1),
                trigger_time: 0.5,
                controller_type: "Pilot_Manual_Control".into(),
                controller_name: "throttle_push2max".into(),
                parameters: HashMap::new(),
            },
        );
        queues.create("Pilot_001");
        assert_eq!(queues.len("Pilot_001"), 1, "re-creating must not drop items");
    }

    #[test]
    fn test_agent_queues_are_independent() {
        let queues = AgentEventQueues::new();
        let item = AgentEventItem {
            event: make_event(3),
            trigger_time: 1.0,
            controller_type: "ATC_command".into(),
            controller_name: "clearance_controller".into(),
            parameters: HashMap::new(),
        };
        queues.enqueue("ATC_001", item);
        assert_eq!(queues.len("ATC_001"), 1);
        assert_eq!(queues.len("Pilot_001"), 0);
        assert!(queues.dequeue("Pilot_001").is_none());
        assert!(queues.dequeue("ATC_001").is_some());
        assert!(queues.dequeue("ATC_001").is_none());
    }
}
