//! Position samples published by vehicles.

use chrono::{DateTime, Utc};

use super::{Coordinate, VehicleId};

/// Error returned when constructing an invalid position sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSample {
    /// Speed was negative or not finite.
    #[error("speed must be a non-negative finite number of km/h")]
    InvalidSpeed,

    /// Heading was outside [0, 360] degrees or not finite.
    #[error("heading must be within [0, 360] degrees")]
    InvalidHeading,
}

/// One GPS reading from a vehicle's publisher.
///
/// Immutable once created. The timestamp is set at receipt when the
/// publisher does not supply one, so samples from clock-less devices
/// still order correctly per vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    vehicle_id: VehicleId,
    coordinate: Coordinate,
    speed_kmh: f64,
    heading_degrees: Option<f64>,
    timestamp: DateTime<Utc>,
}

impl PositionSample {
    /// Validate and construct a sample.
    ///
    /// `speed_kmh` defaults to 0 when absent and must be non-negative.
    /// `heading_degrees`, when present, must be within [0, 360].
    /// `timestamp` defaults to the time of receipt.
    pub fn new(
        vehicle_id: VehicleId,
        coordinate: Coordinate,
        speed_kmh: Option<f64>,
        heading_degrees: Option<f64>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Self, InvalidSample> {
        let speed_kmh = speed_kmh.unwrap_or(0.0);
        if !speed_kmh.is_finite() || speed_kmh < 0.0 {
            return Err(InvalidSample::InvalidSpeed);
        }

        if let Some(heading) = heading_degrees {
            if !heading.is_finite() || !(0.0..=360.0).contains(&heading) {
                return Err(InvalidSample::InvalidHeading);
            }
        }

        Ok(Self {
            vehicle_id,
            coordinate,
            speed_kmh,
            heading_degrees,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        })
    }

    /// The vehicle this sample belongs to.
    pub fn vehicle_id(&self) -> &VehicleId {
        &self.vehicle_id
    }

    /// The sampled position.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Reported speed in km/h (0 when the device did not report one).
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Reported heading in degrees, if any.
    pub fn heading_degrees(&self) -> Option<f64> {
        self.heading_degrees
    }

    /// When the sample was taken (or received).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
