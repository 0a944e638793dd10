//! # flightsim_math
//!
//! Math types for the flight simulation framework. Re-exports [`glam`] for
//! linear algebra and defines the geodetic conversion and 6-DOF force types
//! used by the flight-dynamics dataflow.

pub mod force;
pub mod geodetic;

// Re-export glam types for convenience.
pub use glam::{DMat3, DQuat, DVec2, DVec3};

pub use force::ForceMoment;
pub use geodetic::{Geodetic, ned_to_geodetic};
