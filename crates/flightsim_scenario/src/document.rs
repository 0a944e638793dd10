//! The flight-plan document.
//!
//! The document nests everything under a `flight_plan` key:
//!
//! - `scenario_config` — agent identities and scenario metadata.
//! - `global_initial_state` — five sections seeding the state cells.
//! - `logic_lines` — four named event lines (pilot, aircraft system,
//!   environment, ATC).
//!
//! Parsing is tolerant: unknown keys anywhere are ignored, optional fields
//! default. Validation is strict about the mandatory sections above and runs
//! before any cell is written.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ScenarioError;

/// Names of the five mandatory initial-state sections.
pub const INITIAL_STATE_SECTIONS: [&str; 5] = [
    "flight_dynamics_initial_state",
    "pilot_initial_state",
    "aircraft_initial_state",
    "environment_initial_state",
    "atc_control_initial_state",
];

/// Names of the four mandatory logic lines, in ingestion order.
pub const LOGIC_LINE_SECTIONS: [&str; 4] = [
    "pilot_logic_line",
    "aircraft_system_logic_line",
    "environment_logic_line",
    "ATC_logic_line",
];

/// Scenario metadata and agent identities.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioConfigDoc {
    #[serde(default, alias = "ScenarioName")]
    pub scenario_name: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(default, alias = "ScenarioType")]
    pub scenario_type: String,
    #[serde(default, alias = "Pilot_ID")]
    pub pilot_id: String,
    #[serde(default, alias = "Aircraft_ID")]
    pub aircraft_id: String,
    #[serde(default, alias = "ATC_ID")]
    pub atc_id: String,
    #[serde(default, alias = "Environment_Name")]
    pub environment_name: String,
}

/// A trigger condition as written in the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerConditionDoc {
    #[serde(default)]
    pub condition_expression: String,
    #[serde(default)]
    pub description: String,
}

/// A driven process as written in the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrivenProcessDoc {
    #[serde(default)]
    pub controller_type: String,
    #[serde(default)]
    pub controller_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub termination_condition: String,
}

/// One event of a logic line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlannedEventDoc {
    #[serde(default)]
    pub event_id: u64,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger_condition: TriggerConditionDoc,
    #[serde(default)]
    pub driven_process: DrivenProcessDoc,
}

/// A named logic line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogicLineDoc {
    #[serde(default)]
    pub logic_sequence: Vec<PlannedEventDoc>,
}

/// A parsed and validated flight-plan document.
#[derive(Debug, Clone)]
pub struct FlightPlanDocument {
    pub scenario_config: ScenarioConfigDoc,
    /// Raw initial-state sections, keyed by section name.
    pub initial_state: Vec<(String, Value)>,
    /// Logic lines in ingestion order (pilot, aircraft system, environment,
    /// ATC), keyed by line name.
    pub logic_lines: Vec<(String, LogicLineDoc)>,
    /// The raw `flight_plan` object, retained for the stored cell.
    pub raw: Value,
}

impl FlightPlanDocument {
    /// Parse a document from a JSON value, validating mandatory sections.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::Schema`] names the first missing section;
    /// [`ScenarioError::Json`] covers malformed section contents.
    pub fn from_value(value: Value) -> Result<Self, ScenarioError> {
        let plan = value
            .get("flight_plan")
            .ok_or_else(|| ScenarioError::Schema("flight_plan".to_string()))?;

        let scenario_value = plan
            .get("scenario_config")
            .ok_or_else(|| ScenarioError::Schema("scenario_config".to_string()))?;
        let scenario_config: ScenarioConfigDoc =
            serde_json::from_value(scenario_value.clone())?;

        let initial = plan
            .get("global_initial_state")
            .ok_or_else(|| ScenarioError::Schema("global_initial_state".to_string()))?;
        let mut initial_state = Vec::new();
        for section in INITIAL_STATE_SECTIONS {
            let section_value = initial
                .get(section)
                .ok_or_else(|| ScenarioError::Schema(section.to_string()))?;
            initial_state.push((section.to_string(), section_value.clone()));
        }

        let lines = plan
            .get("logic_lines")
            .ok_or_else(|| ScenarioError::Schema("logic_lines".to_string()))?;
        let mut logic_lines = Vec::new();
        for line in LOGIC_LINE_SECTIONS {
            let line_value = lines
                .get(line)
                .ok_or_else(|| ScenarioError::Schema(line.to_string()))?;
            let parsed: LogicLineDoc = serde_json::from_value(line_value.clone())?;
            logic_lines.push((line.to_string(), parsed));
        }

        Ok(Self {
            scenario_config,
            initial_state,
            logic_lines,
            raw: plan.clone(),
        })
    }

    /// Parse a document from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`FlightPlanDocument::from_value`].
    pub fn from_str(text: &str) -> Result<Self, ScenarioError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Look up one of the raw initial-state sections.
    #[must_use]
    pub fn initial_section(&self, name: &str) -> Option<&Value> {
        self.initial_state
            .iter()
            .find(|(section, _)| section == name)
            .map(|(_, value)| value)
    }
}
