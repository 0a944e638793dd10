//! Cell payload types.
//!
//! The concurrency core treats these as opaque values; the fields below are
//! the dataflow contract between the agents. All types are `Default` (the
//! zeroed value a never-written cell reads as) and `Serialize` for the data
//! recorder.

use serde::{Deserialize, Serialize};

/// Kinematics snapshot written by the flight-dynamics agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftFlightState {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in metres.
    pub altitude: f64,
    /// Roll angle in degrees.
    pub roll: f64,
    /// Pitch angle in degrees.
    pub pitch: f64,
    /// True heading in degrees.
    pub heading: f64,
    /// Airspeed in m/s.
    pub airspeed: f64,
    /// Groundspeed in m/s.
    pub groundspeed: f64,
    /// Vertical speed in m/s, up positive.
    pub vertical_speed: f64,
    /// Distance rolled along the ground since the run started, in metres.
    pub ground_distance: f64,
    pub landing_gear_deployed: bool,
    pub flaps_deployed: bool,
    pub spoilers_deployed: bool,
    /// Brake pressure as seen by the airframe, in percent.
    pub brake_pressure: f64,
}

/// Effector, fuel and engine state written by the aircraft-system agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftSystemState {
    /// Current mass in kg.
    pub mass: f64,
    /// Fuel remaining in kg.
    pub fuel: f64,
    /// Longitudinal centre of gravity offset in metres.
    pub center_of_gravity: f64,
    /// Brake pressure in percent (0–100).
    pub brake_pressure: f64,
    /// Landing gear deployment fraction (1.0 = down and locked).
    pub landing_gear_deployed: f64,
    /// Flap deployment fraction.
    pub flaps_deployed: f64,
    /// Spoiler deployment fraction.
    pub spoilers_deployed: f64,
    /// Aileron deflection, -1..1.
    pub aileron_deflection: f64,
    /// Elevator deflection, -1..1.
    pub elevator_deflection: f64,
    /// Rudder deflection, -1..1.
    pub rudder_deflection: f64,
    /// Throttle position, 0..1.
    pub throttle_position: f64,
}

/// Runway, wind and air state written by the environment agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Runway length in metres.
    pub runway_length: f64,
    /// Runway width in metres.
    pub runway_width: f64,
    /// Tyre-to-surface friction coefficient.
    pub friction_coefficient: f64,
    /// Air density in kg/m³.
    pub air_density: f64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Direction the wind blows from, in degrees.
    pub wind_direction: f64,
}

/// Pilot attention and skill written by the pilot agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PilotState {
    /// Attention level, 0..1.
    pub attention_level: f64,
    /// Skill level, 0..1.
    pub skill_level: f64,
    /// Fatigue level, 0..1.
    pub fatigue_level: f64,
}

/// Command flags written by the ATC agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtcCommand {
    pub clearance_granted: bool,
    pub emergency_brake: bool,
    pub takeoff_cleared: bool,
    pub landing_cleared: bool,
}

/// Merged control target written by the pilot agent and consumed by the
/// aircraft-system agent when `active`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalControlCommand {
    /// Whether the targets below override the system's own trims.
    pub active: bool,
    /// Name of the controller that produced the command.
    pub controller_name: String,
    /// Target throttle position, 0..1.
    pub throttle: f64,
    /// Target brake pressure in percent.
    pub brake: f64,
    /// Target aileron deflection, -1..1.
    pub aileron: f64,
    /// Target elevator deflection, -1..1.
    pub elevator: f64,
    /// Target rudder deflection, -1..1.
    pub rudder: f64,
}

/// Controller-name → running flag, refreshed by the clock after each step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerExecutionStatus {
    running: std::collections::BTreeMap<String, bool>,
}

impl ControllerExecutionStatus {
    pub fn set_status(&mut self, controller_name: &str, running: bool) {
        self.running.insert(controller_name.to_string(), running);
    }

    #[must_use]
    pub fn is_running(&self, controller_name: &str) -> bool {
        self.running.get(controller_name).copied().unwrap_or(false)
    }

    /// Iterate (controller name, running) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.running.iter().map(|(name, &running)| (name.as_str(), running))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_status_defaults_false() {
        let status = ControllerExecutionStatus::default();
        assert!(!status.is_running("clearance_controller"));
    }

    #[test]
    fn test_controller_status_set_and_iter() {
        let mut status = ControllerExecutionStatus::default();
        status.set_status("clearance_controller", true);
        status.set_status("Emergency_Brake_Command", false);
        assert!(status.is_running("clearance_controller"));
        assert!(!status.is_running("Emergency_Brake_Command"));
        let names: Vec<&str> = status.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Emergency_Brake_Command", "clearance_controller"]);
    }
}
