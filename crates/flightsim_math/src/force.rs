//! 6-DOF resultant force and moment.
//!
//! [`ForceMoment`] is the payload of the `aircraft_net_force` cell: the net
//! force and the net moment acting on the airframe, both expressed in the
//! body frame.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A six-degree-of-freedom resultant: net force and net moment in the body
/// frame, in newtons and newton-metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceMoment {
    /// Net force (x forward, y right, z down).
    pub force: DVec3,
    /// Net moment about the body axes (roll, pitch, yaw).
    pub moment: DVec3,
}

impl ForceMoment {
    /// The zero resultant.
    pub const ZERO: Self = Self {
        force: DVec3::ZERO,
        moment: DVec3::ZERO,
    };

    /// Create a resultant from separate force and moment vectors.
    #[must_use]
    pub fn new(force: DVec3, moment: DVec3) -> Self {
        Self { force, moment }
    }

    /// Sum two resultants acting on the same body.
    #[must_use]
    pub fn combined(self, other: Self) -> Self {
        Self {
            force: self.force + other.force,
            moment: self.moment + other.moment,
        }
    }

    /// The magnitude of the net force.
    #[must_use]
    pub fn force_magnitude(&self) -> f64 {
        self.force.length()
    }
}

impl Default for ForceMoment {
    fn default() -> Self {
        Self::ZERO
    }
}
