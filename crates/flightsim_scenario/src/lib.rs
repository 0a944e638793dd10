//! # flightsim_scenario
//!
//! Inputs of a simulation run:
//!
//! - [`config`] — the simulation configuration file (`SimulationConfig.json`).
//! - [`document`] — the structured flight-plan document and its validation.
//! - [`loader`] — the one-shot ingestion step that seeds the shared data
//!   space: initial state cells, the planned-event library and the
//!   planned-controller library.
//!
//! Both parsers accept unknown keys without failure; missing mandatory
//! sections fail before anything is written.

pub mod config;
pub mod document;
pub mod error;
pub mod loader;

pub use config::{DataRecorderConfig, LogConfig, SimulationConfig, SimulationParams};
pub use document::FlightPlanDocument;
pub use error::ScenarioError;
pub use loader::FlightPlanLoader;
