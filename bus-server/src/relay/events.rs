//! Outbound events delivered to subscribed connections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{PositionSample, VehicleId};

/// Coordinate payload as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
}

/// An event the relay pushes to a connection.
///
/// Serialized as `{"event": "...", "data": {...}}` with kebab-case event
/// names and camelCase payload keys, matching what the tracking clients
/// expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum OutboundEvent {
    /// A publisher's accepted position, fanned out to the vehicle's
    /// subscribers.
    LocationUpdate {
        vehicle_id: String,
        location: LocationPayload,
        speed: f64,
        heading: Option<f64>,
        timestamp: DateTime<Utc>,
    },

    /// The vehicle's publisher stopped sharing or disconnected.
    Offline { vehicle_id: String },

    /// Confirmation to a publisher that its claim is live. Sent to the
    /// claiming connection only.
    SharingStarted { vehicle_id: String },

    /// An inbound event was malformed or invalid and has been dropped.
    Error { message: String },
}

impl OutboundEvent {
    /// Build the fan-out event for an accepted sample.
    pub fn location_update(sample: &PositionSample) -> Self {
        Self::LocationUpdate {
            vehicle_id: sample.vehicle_id().to_string(),
            location: LocationPayload {
                latitude: sample.coordinate().latitude(),
                longitude: sample.coordinate().longitude(),
            },
            speed: sample.speed_kmh(),
            heading: sample.heading_degrees(),
            timestamp: sample.timestamp(),
        }
    }

    /// Build the offline notification for a vehicle.
    pub fn offline(vehicle_id: &VehicleId) -> Self {
        Self::Offline {
            vehicle_id: vehicle_id.to_string(),
        }
    }

    /// Build the claim confirmation for a vehicle.
    pub fn sharing_started(vehicle_id: &VehicleId) -> Self {
        Self::SharingStarted {
            vehicle_id: vehicle_id.to_string(),
        }
    }

    /// Build an error report for the offending connection.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use serde_json::json;

    #[test]
    fn offline_wire_shape() {
        let vehicle = VehicleId::parse("BUS-1").unwrap();
        let value = serde_json::to_value(OutboundEvent::offline(&vehicle)).unwrap();
        assert_eq!(
            value,
            json!({"event": "offline", "data": {"vehicleId": "BUS-1"}})
        );
    }

    #[test]
    fn sharing_started_wire_shape() {
        let vehicle = VehicleId::parse("BUS-1").unwrap();
        let value = serde_json::to_value(OutboundEvent::sharing_started(&vehicle)).unwrap();
        assert_eq!(
            value,
            json!({"event": "sharing-started", "data": {"vehicleId": "BUS-1"}})
        );
    }

    #[test]
    fn location_update_wire_shape() {
        let sample = PositionSample::new(
            VehicleId::parse("BUS-1").unwrap(),
            Coordinate::new(10.0, 20.0).unwrap(),
            Some(30.0),
            Some(90.0),
            Some("2026-01-02T03:04:05Z".parse().unwrap()),
        )
        .unwrap();

        let value = serde_json::to_value(OutboundEvent::location_update(&sample)).unwrap();
        assert_eq!(value["event"], "location-update");
        assert_eq!(value["data"]["vehicleId"], "BUS-1");
        assert_eq!(value["data"]["location"]["latitude"], 10.0);
        assert_eq!(value["data"]["location"]["longitude"], 20.0);
        assert_eq!(value["data"]["speed"], 30.0);
        assert_eq!(value["data"]["heading"], 90.0);
        assert_eq!(value["data"]["timestamp"], "2026-01-02T03:04:05Z");
    }
}
