//! One-shot flight-plan ingestion.
//!
//! The loader runs once at startup, before any thread is spawned. It parses
//! and validates the scenario document, then seeds the shared data space:
//! initial state cells, the planned-event library (with a dense global id
//! sequence), the planned-controller library, and the stored
//! `flight_plan_data` cell. All of its writes carry
//! `data_source = "flight_plan_loader"` and count as step-0 inputs.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use flightsim_data::state::{
    AircraftFlightState, AircraftSystemState, AtcCommand, EnvironmentState, PilotState,
};
use flightsim_data::{
    DrivenProcess, FlightPlanData, PlannedController, PlannedControllersLibrary, ScenarioConfig,
    SharedDataSpace, StandardEvent, TriggerCondition,
};
use flightsim_math::DVec3;
use flightsim_math::geodetic::ned_to_geodetic;

use crate::document::{FlightPlanDocument, PlannedEventDoc};
use crate::error::ScenarioError;

/// Reference point of the scenario NED frame (ZBAA reference).
pub const REF_LATITUDE: f64 = 39.9083;
/// Reference longitude of the scenario NED frame.
pub const REF_LONGITUDE: f64 = 116.3975;

/// Specific gas constant of dry air, J/(kg·K).
const GAS_CONSTANT_AIR: f64 = 287.0;

const LOADER_SOURCE: &str = "flight_plan_loader";

/// The one-shot scenario ingestion step.
#[derive(Debug)]
pub struct FlightPlanLoader {
    document: FlightPlanDocument,
    file_path: String,
}

impl FlightPlanLoader {
    /// Parse and validate a scenario document from a file.
    ///
    /// # Errors
    ///
    /// I/O, JSON, and schema failures are all fatal; nothing has been
    /// written to the data space when this returns an error.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let document = FlightPlanDocument::from_str(&text)?;
        Ok(Self {
            document,
            file_path: path.display().to_string(),
        })
    }

    /// Parse and validate a scenario document from an in-memory value.
    ///
    /// # Errors
    ///
    /// See [`FlightPlanLoader::from_file`].
    pub fn from_value(value: Value) -> Result<Self, ScenarioError> {
        let document = FlightPlanDocument::from_value(value)?;
        Ok(Self {
            document,
            file_path: String::new(),
        })
    }

    /// The validated document.
    #[must_use]
    pub fn document(&self) -> &FlightPlanDocument {
        &self.document
    }

    /// Seed the shared data space from the validated document.
    pub fn store(&self, sds: &SharedDataSpace) {
        let scenario_config = self.scenario_config();
        info!(
            scenario = scenario_config.scenario_name,
            pilot = scenario_config.pilot_id,
            aircraft = scenario_config.aircraft_id,
            atc = scenario_config.atc_id,
            "storing flight plan"
        );

        self.store_flight_plan_cell(sds, scenario_config);
        self.store_initial_states(sds);
        self.store_event_and_controller_libraries(sds);
    }

    fn scenario_config(&self) -> ScenarioConfig {
        let doc = &self.document.scenario_config;
        let or_default = |value: &str, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };
        ScenarioConfig {
            scenario_name: doc.scenario_name.clone(),
            description: doc.description.clone(),
            scenario_type: doc.scenario_type.clone(),
            pilot_id: or_default(&doc.pilot_id, "Pilot_001"),
            aircraft_id: or_default(&doc.aircraft_id, "Aircraft_001"),
            atc_id: or_default(&doc.atc_id, "ATC_001"),
            environment_name: or_default(&doc.environment_name, "Environment_001"),
        }
    }

    fn store_flight_plan_cell(&self, sds: &SharedDataSpace, scenario_config: ScenarioConfig) {
        let mut global_initial_state = BTreeMap::new();
        for (section, value) in &self.document.initial_state {
            global_initial_state.insert(section.clone(), value.clone());
        }
        let mut logic_lines = BTreeMap::new();
        if let Some(lines) = self.document.raw.get("logic_lines").and_then(Value::as_object) {
            for (line, value) in lines {
                logic_lines.insert(line.clone(), value.clone());
            }
        }
        sds.set_flight_plan_data(
            FlightPlanData {
                scenario_config,
                global_initial_state,
                logic_lines,
                is_parsed: true,
                file_path: self.file_path.clone(),
            },
            LOADER_SOURCE,
        );
    }

    fn store_initial_states(&self, sds: &SharedDataSpace) {
        if let Some(section) = self.document.initial_section("flight_dynamics_initial_state") {
            sds.set_flight_state(parse_flight_dynamics_state(section), LOADER_SOURCE);
        }
        if let Some(section) = self.document.initial_section("aircraft_initial_state") {
            sds.set_system_state(parse_aircraft_system_state(section), LOADER_SOURCE);
        }
        if let Some(section) = self.document.initial_section("environment_initial_state") {
            sds.set_environment_state(parse_environment_state(section), LOADER_SOURCE);
        }
        if let Some(section) = self.document.initial_section("pilot_initial_state") {
            sds.set_pilot_state(parse_pilot_state(section), LOADER_SOURCE);
        }
        if let Some(section) = self.document.initial_section("atc_control_initial_state") {
            sds.set_atc_command(parse_atc_state(section), LOADER_SOURCE);
        }
    }

    /// Fill the planned-event and planned-controller libraries. Event ids
    /// are reassigned to a dense global sequence in line order; the original
    /// per-line ids survive on the planned controllers.
    fn store_event_and_controller_libraries(&self, sds: &SharedDataSpace) {
        let mut controllers = PlannedControllersLibrary::default();
        let mut next_id: u64 = 1;

        for (line_name, line) in &self.document.logic_lines {
            for event_doc in &line.logic_sequence {
                let event = standard_event(next_id, line_name, event_doc);
                debug!(
                    id = event.id,
                    name = event.name,
                    line = line_name,
                    condition = event.trigger_condition.expression,
                    "planned event loaded"
                );
                if !sds.add_planned_event(event) {
                    warn!(id = next_id, line = line_name, "duplicate planned event id; skipped");
                }
                next_id += 1;

                if !event_doc.driven_process.controller_name.is_empty() {
                    controllers.insert(PlannedController {
                        event_id: event_doc.event_id.to_string(),
                        event_name: event_doc.event_name.clone(),
                        controller_type: event_doc.driven_process.controller_type.clone(),
                        controller_name: event_doc.driven_process.controller_name.clone(),
                        description: event_doc.driven_process.description.clone(),
                        termination_condition: event_doc
                            .driven_process
                            .termination_condition
                            .clone(),
                    });
                }
            }
        }

        info!(
            events = next_id - 1,
            controllers = controllers.len(),
            "planned libraries filled"
        );
        sds.set_planned_controllers(controllers, LOADER_SOURCE);
    }
}

fn standard_event(id: u64, line_name: &str, doc: &PlannedEventDoc) -> StandardEvent {
    StandardEvent {
        id,
        name: doc.event_name.clone(),
        description: doc.description.clone(),
        trigger_condition: TriggerCondition {
            expression: doc.trigger_condition.condition_expression.clone(),
            description: doc.trigger_condition.description.clone(),
        },
        driven_process: DrivenProcess {
            controller_type: doc.driven_process.controller_type.clone(),
            controller_name: doc.driven_process.controller_name.clone(),
            description: doc.driven_process.description.clone(),
            termination_condition: doc.driven_process.termination_condition.clone(),
        },
        source_agent: line_name.to_string(),
    }
}

// ── Initial-state interpretation ────────────────────────────────────────────

fn get_f64(value: &Value, key: &str, default: f64) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn get_str<'a>(value: &'a Value, key: &str, default: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn get_bool(value: &Value, key: &str, default: bool) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn parse_flight_dynamics_state(section: &Value) -> AircraftFlightState {
    let mut state = AircraftFlightState {
        latitude: REF_LATITUDE,
        longitude: REF_LONGITUDE,
        heading: 90.0,
        landing_gear_deployed: true,
        brake_pressure: 100.0,
        ..AircraftFlightState::default()
    };

    if let Some(position) = section.get("position") {
        let ned = DVec3::new(
            get_f64(position, "x", 0.0),
            get_f64(position, "y", 0.0),
            get_f64(position, "z", 0.0),
        );
        let geo = ned_to_geodetic(REF_LATITUDE, REF_LONGITUDE, ned);
        state.latitude = geo.latitude;
        state.longitude = geo.longitude;
        state.altitude = geo.altitude;
    }

    if let Some(attitude) = section.get("attitude") {
        state.roll = get_f64(attitude, "roll", 0.0);
        state.pitch = get_f64(attitude, "pitch", 0.0);
        state.heading = get_f64(attitude, "yaw", 90.0);
    }

    if let Some(velocity) = section.get("velocity") {
        let vx = get_f64(velocity, "vx", 0.0);
        let vy = get_f64(velocity, "vy", 0.0);
        let vz = get_f64(velocity, "vz", 0.0);
        state.airspeed = (vx * vx + vy * vy).sqrt();
        // Still air at load time: groundspeed equals airspeed.
        state.groundspeed = state.airspeed;
        state.vertical_speed = -vz;
    }

    state
}

fn parse_aircraft_system_state(section: &Value) -> AircraftSystemState {
    let brake_applied = get_str(section, "brake_status", "applied") == "applied";
    let gear_down = get_str(section, "landing_gear_position", "down_locked") == "down_locked";
    AircraftSystemState {
        mass: get_f64(section, "mass", 70_000.0),
        fuel: get_f64(section, "fuel_quantity", 10_000.0),
        center_of_gravity: get_f64(section, "center_of_gravity", 0.0),
        brake_pressure: if brake_applied { 100.0 } else { 0.0 },
        landing_gear_deployed: if gear_down { 1.0 } else { 0.0 },
        flaps_deployed: get_f64(section, "flaps_position", 0.0),
        spoilers_deployed: 0.0,
        aileron_deflection: get_f64(section, "aileron_position", 0.0),
        elevator_deflection: get_f64(section, "elevator_position", 0.0),
        rudder_deflection: get_f64(section, "rudder_position", 0.0),
        throttle_position: get_f64(section, "throttle_position", 0.05),
    }
}

fn parse_environment_state(section: &Value) -> EnvironmentState {
    let mut state = EnvironmentState {
        runway_length: 3_800.0,
        runway_width: 60.0,
        friction_coefficient: 0.7,
        air_density: 1.225,
        ..EnvironmentState::default()
    };

    if let Some(runway) = section.get("runway") {
        state.runway_length = get_f64(runway, "length", 3_800.0);
        state.runway_width = get_f64(runway, "width", 60.0);
        state.friction_coefficient = get_f64(runway, "friction_coefficient", 0.7);
    }

    if let Some(weather) = section.get("weather") {
        // Ideal-gas density from pressure (hPa) and temperature (°C).
        let pressure_pa = get_f64(weather, "atmospheric_pressure", 1013.25) * 100.0;
        let temperature_k = get_f64(weather, "temperature", 15.0) + 273.15;
        state.air_density = pressure_pa / (GAS_CONSTANT_AIR * temperature_k);
    }

    if let Some(wind) = section.get("wind") {
        state.wind_speed = get_f64(wind, "speed", 0.0);
        state.wind_direction = get_f64(wind, "direction", 0.0);
    }

    state
}

fn parse_pilot_state(section: &Value) -> PilotState {
    // Attention may be given as a percentage string ("100%") or a number.
    let attention_level = match section.get("attention_level") {
        Some(Value::String(text)) => text
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map(|percent| percent / 100.0)
            .unwrap_or(1.0),
        Some(value) => value.as_f64().unwrap_or(1.0),
        None => 1.0,
    };

    let skill_level = match get_str(section, "experience_level", "expert") {
        "expert" => 0.9,
        "senior" => 0.8,
        "intermediate" => 0.6,
        "junior" => 0.4,
        _ => 0.9,
    };

    PilotState {
        attention_level,
        skill_level,
        fatigue_level: get_f64(section, "fatigue_level", 0.0),
    }
}

fn parse_atc_state(section: &Value) -> AtcCommand {
    AtcCommand {
        clearance_granted: get_bool(section, "clearance_granted", false),
        emergency_brake: get_bool(section, "emergency_brake", false),
        takeoff_cleared: get_bool(section, "takeoff_cleared", false),
        landing_cleared: get_bool(section, "landing_cleared", false),
    }
}
