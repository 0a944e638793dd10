//! Planned and triggered event libraries.
//!
//! Planned events come from the scenario document and are immutable after
//! load. The triggered library is append-only and indexed by the step at
//! which each event fired; an event id appears at most once per step, and
//! the monitor guarantees at most once per run.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// The condition under which a planned event fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    /// A disjunction of atomic predicates, e.g. `"time > 2.0 || speed > 5"`.
    pub expression: String,
    /// Free-text description from the scenario document.
    pub description: String,
}

/// The process an event drives once it fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrivenProcess {
    /// Controller type, used to route the event to its owning agent.
    pub controller_type: String,
    /// Controller name, resolved by the owning agent's registry.
    pub controller_name: String,
    /// Free-text description.
    pub description: String,
    /// Condition under which the driven process ends.
    pub termination_condition: String,
}

/// A planned event from the scenario document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardEvent {
    /// Dense, globally unique event id assigned by the loader.
    pub id: u64,
    /// Event name from the scenario document.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// When the event fires.
    pub trigger_condition: TriggerCondition,
    /// What the event drives.
    pub driven_process: DrivenProcess,
    /// The logic line the event came from.
    pub source_agent: String,
}

/// The ordered set of planned events. Immutable after load.
#[derive(Debug, Default)]
pub struct PlannedEventLibrary {
    events: Mutex<Vec<StandardEvent>>,
}

impl PlannedEventLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a planned event. Returns `false` (and keeps the library
    /// unchanged) if the id is already present.
    pub fn add(&self, event: StandardEvent) -> bool {
        let mut events = self.events.lock().expect("planned library poisoned");
        if events.iter().any(|e| e.id == event.id) {
            return false;
        }
        events.push(event);
        true
    }

    /// A snapshot of all planned events in insertion order.
    #[must_use]
    pub fn events(&self) -> Vec<StandardEvent> {
        self.events.lock().expect("planned library poisoned").clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().expect("planned library poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The append-only, step-indexed library of triggered events.
#[derive(Debug, Default)]
pub struct TriggeredEventLibrary {
    by_step: Mutex<BTreeMap<u64, Vec<StandardEvent>>>,
}

impl TriggeredEventLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event as triggered at `step`. Returns `false` if an event
    /// with the same id was already recorded at that step.
    pub fn add_at_step(&self, step: u64, event: StandardEvent) -> bool {
        let mut by_step = self.by_step.lock().expect("triggered library poisoned");
        let entry = by_step.entry(step).or_default();
        if entry.iter().any(|e| e.id == event.id) {
            return false;
        }
        entry.push(event);
        true
    }

    /// Events triggered at exactly `step`.
    #[must_use]
    pub fn events_at_step(&self, step: u64) -> Vec<StandardEvent> {
        self.by_step
            .lock()
            .expect("triggered library poisoned")
            .get(&step)
            .cloned()
            .unwrap_or_default()
    }

    /// Events triggered within a small step window, with their steps.
    #[must_use]
    pub fn events_in_window(&self, window: RangeInclusive<u64>) -> Vec<(u64, StandardEvent)> {
        self.by_step
            .lock()
            .expect("triggered library poisoned")
            .range(window)
            .flat_map(|(&step, events)| events.iter().cloned().map(move |e| (step, e)))
            .collect()
    }

    /// Whether an event id has been recorded at any step.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.by_step
            .lock()
            .expect("triggered library poisoned")
            .values()
            .any(|events| events.iter().any(|e| e.id == id))
    }

    /// Names of all triggered events, in step order.
    #[must_use]
    pub fn triggered_names(&self) -> Vec<String> {
        self.by_step
            .lock()
            .expect("triggered library poisoned")
            .values()
            .flat_map(|events| events.iter().map(|e| e.name.clone()))
            .collect()
    }

    /// Total number of recorded triggers across all steps.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_step
            .lock()
            .expect("triggered library poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(id: u64, name: &str) -> StandardEvent {
        StandardEvent {
            id,
            name: name.to_string(),
            ..StandardEvent::default()
        }
    }

    #[test]
    fn test_planned_library_rejects_duplicate_ids() {
        let library = PlannedEventLibrary::new();
        assert!(library.add(make_event(1, "clearance")));
        assert!(!library.add(make_event(1, "clearance_again")));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_planned_library_preserves_order() {
        let library = PlannedEventLibrary::new();
        library.add(make_event(2, "b"));
        library.add(make_event(1, "a"));
        let names: Vec<String> = library.events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_triggered_library_dedups_within_step() {
        let library = TriggeredEventLibrary::new();
        assert!(library.add_at_step(5, make_event(1, "a")));
        assert!(!library.add_at_step(5, make_event(1, "a")));
        assert!(library.add_at_step(6, make_event(1, "a")));
        assert_eq!(library.events_at_step(5).len(), 1);
        assert_eq!(library.total(), 2);
    }

    #[test]
    fn test_window_lookup() {
        let library = TriggeredEventLibrary::new();
        library.add_at_step(1, make_event(1, "a"));
        library.add_at_step(3, make_event(2, "b"));
        library.add_at_step(9, make_event(3, "c"));
        let window: Vec<u64> = library
            .events_in_window(2..=5)
            .into_iter()
            .map(|(step, _)| step)
            .collect();
        assert_eq!(window, vec![3]);
    }

    #[test]
    fn test_contains_any_step() {
        let library = TriggeredEventLibrary::new();
        assert!(!library.contains(7));
        library.add_at_step(42, make_event(7, "late"));
        assert!(library.contains(7));
    }
}
