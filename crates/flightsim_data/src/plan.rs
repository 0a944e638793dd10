//! Stored flight-plan data and the planned-controller library.
//!
//! Both are cell payloads: the loader writes them once at startup and the
//! rest of the system reads them (dispatcher mapping, agent controller
//! lookup, end-of-run reporting).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Agent identities and scenario metadata from the scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub scenario_name: String,
    pub description: String,
    pub scenario_type: String,
    pub pilot_id: String,
    pub aircraft_id: String,
    pub atc_id: String,
    pub environment_name: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            scenario_name: String::new(),
            description: String::new(),
            scenario_type: String::new(),
            pilot_id: "Pilot_001".to_string(),
            aircraft_id: "Aircraft_001".to_string(),
            atc_id: "ATC_001".to_string(),
            environment_name: "Environment_001".to_string(),
        }
    }
}

/// The parsed scenario document as stored in the `flight_plan_data` cell.
///
/// The raw initial-state and logic-line sections are retained verbatim so
/// downstream consumers (and the recorder) can see exactly what was loaded,
/// including the original per-line event ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanData {
    pub scenario_config: ScenarioConfig,
    /// Raw initial-state sections keyed by section name.
    pub global_initial_state: BTreeMap<String, serde_json::Value>,
    /// Raw logic-line sections keyed by line name.
    pub logic_lines: BTreeMap<String, serde_json::Value>,
    /// Whether a document has been ingested.
    pub is_parsed: bool,
    /// Path of the source document, if it came from a file.
    pub file_path: String,
}

/// One planned controller extracted from a logic line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannedController {
    /// Original per-line event id from the scenario document.
    pub event_id: String,
    /// Name of the event that drives this controller.
    pub event_name: String,
    pub controller_type: String,
    pub controller_name: String,
    pub description: String,
    pub termination_condition: String,
}

/// Planned controllers keyed by controller name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannedControllersLibrary {
    controllers: BTreeMap<String, PlannedController>,
}

impl PlannedControllersLibrary {
    /// Insert or replace a controller under its name.
    pub fn insert(&mut self, controller: PlannedController) {
        self.controllers
            .insert(controller.controller_name.clone(), controller);
    }

    #[must_use]
    pub fn get(&self, controller_name: &str) -> Option<&PlannedController> {
        self.controllers.get(controller_name)
    }

    /// All controllers in name order.
    pub fn all(&self) -> impl Iterator<Item = &PlannedController> {
        self.controllers.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
