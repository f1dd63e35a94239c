//! Great-circle distance and ETA arithmetic.
//!
//! Distances use the haversine formula on a spherical Earth, which is
//! accurate to well under 0.5% at city scale. ETAs are a straight
//! distance-over-speed estimate, not route-following.

use crate::domain::Coordinate;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average vehicle speed for ETA estimates (km/h) when no better
/// figure is available. Calibrated for city traffic.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 25.0;

/// Error returned for an unusable numeric input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter: {reason}")]
pub struct InvalidParameter {
    reason: &'static str,
}

/// Great-circle distance between two coordinates in kilometres.
///
/// Symmetric, and 0 for identical coordinates.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude().to_radians().cos()
            * b.latitude().to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Estimated minutes to cover `distance_km` at `average_speed_kmh`,
/// rounded to the nearest whole minute.
pub fn eta_minutes(distance_km: f64, average_speed_kmh: f64) -> Result<u32, InvalidParameter> {
    if !average_speed_kmh.is_finite() || average_speed_kmh <= 0.0 {
        return Err(InvalidParameter {
            reason: "average speed must be a positive number of km/h",
        });
    }
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(InvalidParameter {
            reason: "distance must be a non-negative number of km",
        });
    }

    Ok((distance_km / average_speed_kmh * 60.0).round() as u32)
}
