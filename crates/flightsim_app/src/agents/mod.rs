//! The five standard agents.
//!
//! Each is an [`AgentBehavior`](flightsim_agent::AgentBehavior) implementing
//! one corner of the dataflow contract: environment → aircraft system →
//! flight dynamics, with the pilot and ATC reacting to routed events.

pub mod aircraft_system;
pub mod atc;
pub mod environment;
pub mod flight_dynamics;
pub mod pilot;

pub use aircraft_system::AircraftSystemAgent;
pub use atc::AtcAgent;
pub use environment::EnvironmentAgent;
pub use flight_dynamics::FlightDynamicsAgent;
pub use pilot::PilotAgent;
