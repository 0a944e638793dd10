//! Default dynamics model: ground roll.
//!
//! The core treats dynamics as a plugin; this default covers the taxi
//! regime the seed scenarios exercise. Longitudinal forces only: engine
//! thrust from throttle, brake force, rolling friction, and aerodynamic
//! drag against the headwind component. The position integrates along the
//! current heading.

use flightsim_agent::DynamicsModel;
use flightsim_data::state::{AircraftFlightState, AircraftSystemState, EnvironmentState};
use flightsim_math::{DVec3, ForceMoment};

const GRAVITY: f64 = 9.81;
/// Metres per degree of latitude under the spherical approximation.
const METRES_PER_DEG_LAT: f64 = 111_194.9;

/// Tunable coefficients of the ground-roll model.
#[derive(Debug, Clone)]
pub struct GroundRollCoefficients {
    /// Maximum total thrust at full throttle, in newtons.
    pub max_thrust: f64,
    /// Brake force at 100 % brake pressure, in newtons.
    pub max_brake_force: f64,
    /// Rolling-resistance coefficient.
    pub rolling_resistance: f64,
    /// Drag area term `0.5 * C_d * A`, in m².
    pub drag_area: f64,
}

impl Default for GroundRollCoefficients {
    fn default() -> Self {
        Self {
            max_thrust: 240_000.0,
            max_brake_force: 180_000.0,
            rolling_resistance: 0.02,
            drag_area: 35.0,
        }
    }
}

/// Taxi/ground-roll dynamics.
#[derive(Debug)]
pub struct GroundRollModel {
    coefficients: GroundRollCoefficients,
    state: AircraftFlightState,
    forces: ForceMoment,
}

impl GroundRollModel {
    #[must_use]
    pub fn new(coefficients: GroundRollCoefficients) -> Self {
        Self {
            coefficients,
            state: AircraftFlightState::default(),
            forces: ForceMoment::ZERO,
        }
    }

    fn net_longitudinal_force(
        &self,
        system: &AircraftSystemState,
        environment: &EnvironmentState,
    ) -> f64 {
        let coefficients = &self.coefficients;
        let mass = if system.mass > 0.0 { system.mass } else { 70_000.0 };
        let speed = self.state.groundspeed;

        let thrust = system.throttle_position.clamp(0.0, 1.0) * coefficients.max_thrust;

        let mut retarding = 0.0;
        if speed > 0.0 {
            retarding += (system.brake_pressure / 100.0).clamp(0.0, 1.0)
                * coefficients.max_brake_force
                * environment.friction_coefficient.max(0.1);
            retarding += coefficients.rolling_resistance * mass * GRAVITY;

            // Drag against the airspeed along the roll direction.
            let headwind = headwind_component(self.state.heading, environment);
            let relative = speed + headwind;
            retarding += coefficients.drag_area
                * environment.air_density.max(0.0)
                * relative
                * relative.abs()
                / 2.0;
        }

        thrust - retarding
    }
}

/// Wind speed projected against the roll direction; positive = headwind.
fn headwind_component(heading_deg: f64, environment: &EnvironmentState) -> f64 {
    let relative = (environment.wind_direction - heading_deg).to_radians();
    environment.wind_speed * relative.cos()
}

impl Default for GroundRollModel {
    fn default() -> Self {
        Self::new(GroundRollCoefficients::default())
    }
}

impl DynamicsModel for GroundRollModel {
    fn initialize(&mut self, state: &AircraftFlightState) {
        self.state = state.clone();
        self.forces = ForceMoment::ZERO;
    }

    fn step(
        &mut self,
        dt: f64,
        system: &AircraftSystemState,
        environment: &EnvironmentState,
    ) -> AircraftFlightState {
        let mass = if system.mass > 0.0 { system.mass } else { 70_000.0 };
        let force = self.net_longitudinal_force(system, environment);
        self.forces = ForceMoment::new(
            DVec3::new(force, 0.0, -mass * GRAVITY),
            DVec3::ZERO,
        );

        let acceleration = force / mass;
        let speed = (self.state.groundspeed + acceleration * dt).max(0.0);
        let distance = speed * dt;

        let heading = self.state.heading.to_radians();
        self.state.latitude += distance * heading.cos() / METRES_PER_DEG_LAT;
        self.state.longitude += distance * heading.sin()
            / (METRES_PER_DEG_LAT * self.state.latitude.to_radians().cos());

        self.state.groundspeed = speed;
        let headwind = headwind_component(self.state.heading, environment);
        self.state.airspeed = (speed + headwind).max(0.0);
        self.state.ground_distance += distance;
        self.state.brake_pressure = system.brake_pressure;
        self.state.landing_gear_deployed = system.landing_gear_deployed > 0.5;
        self.state.flaps_deployed = system.flaps_deployed > 0.0;
        self.state.spoilers_deployed = system.spoilers_deployed > 0.0;

        self.state.clone()
    }

    fn current_forces(&self) -> ForceMoment {
        self.forces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxi_environment() -> EnvironmentState {
        EnvironmentState {
            runway_length: 3800.0,
            runway_width: 60.0,
            friction_coefficient: 0.7,
            air_density: 1.225,
            wind_speed: 0.0,
            wind_direction: 0.0,
        }
    }

    fn stationary_system(throttle: f64, brake: f64) -> AircraftSystemState {
        AircraftSystemState {
            mass: 70_000.0,
            throttle_position: throttle,
            brake_pressure: brake,
            landing_gear_deployed: 1.0,
            ..AircraftSystemState::default()
        }
    }

    #[test]
    fn test_throttle_accelerates_from_rest() {
        let mut model = GroundRollModel::default();
        model.initialize(&AircraftFlightState::default());

        let mut state = AircraftFlightState::default();
        for _ in 0..100 {
            state = model.step(0.01, &stationary_system(0.8, 0.0), &taxi_environment());
        }
        assert!(state.groundspeed > 0.5, "one second of thrust must move the aircraft");
        assert!(state.ground_distance > 0.0);
        assert!(model.current_forces().force.x > 0.0);
    }

    #[test]
    fn test_brakes_decelerate() {
        let mut model = GroundRollModel::default();
        let mut state = AircraftFlightState {
            groundspeed: 10.0,
            ..AircraftFlightState::default()
        };
        model.initialize(&state);

        let before = state.groundspeed;
        for _ in 0..5 {
            state = model.step(0.01, &stationary_system(0.0, 100.0), &taxi_environment());
        }
        assert!(state.groundspeed < before, "full brakes must bleed speed");
        assert!(model.current_forces().force.x < 0.0);
    }

    #[test]
    fn test_speed_never_goes_negative() {
        let mut model = GroundRollModel::default();
        model.initialize(&AircraftFlightState {
            groundspeed: 0.2,
            ..AircraftFlightState::default()
        });
        let mut state = AircraftFlightState::default();
        for _ in 0..200 {
            state = model.step(0.01, &stationary_system(0.0, 100.0), &taxi_environment());
        }
        assert_eq!(state.groundspeed, 0.0);
    }

    #[test]
    fn test_stationary_aircraft_stays_put_without_thrust() {
        let mut model = GroundRollModel::default();
        let initial = AircraftFlightState {
            latitude: 39.9,
            longitude: 116.4,
            ..AircraftFlightState::default()
        };
        model.initialize(&initial);
        let state = model.step(0.01, &stationary_system(0.0, 100.0), &taxi_environment());
        assert_eq!(state.latitude, initial.latitude);
        assert_eq!(state.longitude, initial.longitude);
        assert_eq!(state.groundspeed, 0.0);
    }

    #[test]
    fn test_position_moves_along_heading() {
        let mut model = GroundRollModel::default();
        model.initialize(&AircraftFlightState {
            latitude: 39.9,
            longitude: 116.4,
            heading: 90.0,
            groundspeed: 10.0,
            ..AircraftFlightState::default()
        });
        let state = model.step(0.01, &stationary_system(0.3, 0.0), &taxi_environment());
        assert!(state.longitude > 116.4, "east heading moves longitude");
        assert!((state.latitude - 39.9).abs() < 1e-9);
    }
}
