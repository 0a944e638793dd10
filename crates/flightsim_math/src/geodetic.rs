//! NED to geodetic conversion.
//!
//! Scenario documents give the initial aircraft position in a local
//! north-east-down frame anchored at a reference latitude/longitude. The
//! loader converts it to geographic coordinates with a small-angle spherical
//! approximation; the error is negligible at airfield scale.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the spherical approximation, in metres.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// A geographic position: latitude/longitude in degrees, altitude in metres
/// above the reference surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geodetic {
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Altitude in metres, up positive.
    pub altitude: f64,
}

/// Convert a local NED offset to geographic coordinates around a reference
/// point.
///
/// `ned.x` is north, `ned.y` is east, `ned.z` is down; altitude is the
/// negated down component. Latitude/longitude offsets use arc length on a
/// sphere of radius [`EARTH_RADIUS`], with the longitude circle shrunk by
/// `cos(latitude)`.
#[must_use]
pub fn ned_to_geodetic(ref_lat_deg: f64, ref_lon_deg: f64, ned: DVec3) -> Geodetic {
    let lat_offset = (ned.x / EARTH_RADIUS).to_degrees();
    let lon_offset = (ned.y / (EARTH_RADIUS * ref_lat_deg.to_radians().cos())).to_degrees();
    Geodetic {
        latitude: ref_lat_deg + lat_offset,
        longitude: ref_lon_deg + lon_offset,
        altitude: -ned.z,
    }
}
