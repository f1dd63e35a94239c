//! Data transfer objects for web requests, responses and inbound events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PositionSample, Stop};
use crate::ranking::RankedVehicle;

/// Event received from a connection over the WebSocket.
///
/// Wire format mirrors [`crate::relay::OutboundEvent`]:
/// `{"event": "...", "data": {...}}`, kebab-case event names, camelCase
/// payload keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum InboundEvent {
    /// A driver starts publishing a vehicle's location.
    StartSharing {
        vehicle_id: String,
        /// Caller identity, carried for logging only; role enforcement
        /// happens upstream of this layer.
        driver_id: Option<String>,
    },

    /// A position report from the vehicle's publisher.
    LocationUpdate {
        vehicle_id: String,
        latitude: f64,
        longitude: f64,
        speed: Option<f64>,
        heading: Option<f64>,
    },

    /// A passenger subscribes to a vehicle's updates.
    TrackBus { vehicle_id: String },

    /// A passenger unsubscribes.
    UntrackBus { vehicle_id: String },

    /// The publisher stops sharing a vehicle.
    StopSharing { vehicle_id: String },
}

/// Request body to create or replace a stop.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStopRequest {
    pub stop_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A stop in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDto {
    pub stop_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StopDto {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            stop_code: stop.code().to_string(),
            latitude: stop.coordinate().latitude(),
            longitude: stop.coordinate().longitude(),
        }
    }
}

/// A position in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub heading: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PositionDto {
    pub fn from_sample(sample: &PositionSample) -> Self {
        Self {
            latitude: sample.coordinate().latitude(),
            longitude: sample.coordinate().longitude(),
            speed: sample.speed_kmh(),
            heading: sample.heading_degrees(),
            timestamp: sample.timestamp(),
        }
    }
}

/// One ranked vehicle in a nearest-buses response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedVehicleDto {
    pub vehicle_id: String,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub last_known_position: PositionDto,
}

impl RankedVehicleDto {
    pub fn from_ranked(ranked: &RankedVehicle) -> Self {
        Self {
            vehicle_id: ranked.vehicle_id.to_string(),
            distance_km: ranked.distance_km,
            eta_minutes: ranked.eta_minutes,
            last_known_position: PositionDto::from_sample(&ranked.last_known_position),
        }
    }
}

/// Response for a nearest-buses query.
#[derive(Debug, Serialize)]
pub struct NearestBusesResponse {
    pub stop: StopDto,
    pub buses: Vec<RankedVehicleDto>,
    pub count: usize,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<Utc>,
}

/// Error body for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
