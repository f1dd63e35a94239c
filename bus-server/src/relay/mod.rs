//! Location relay: validated telemetry in, best-effort fan-out.
//!
//! The relay sits between the transport layer and the subscription
//! registry. Inbound handlers call it with raw payloads; it validates
//! them, mutates registry state, and only then dispatches events through
//! an [`EventSink`], never holding a registry lock across delivery.
//!
//! Delivery is fire-and-forget per subscriber. A failed send is the
//! sink's problem to log; it never aborts delivery to the remaining
//! subscribers and never rolls back the state mutation that triggered it.

mod events;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{
    ConnectionId, Coordinate, InvalidCoordinate, InvalidSample, PositionSample, VehicleId,
};
use crate::registry::SubscriptionRegistry;

pub use events::{LocationPayload, OutboundEvent};

/// Transport-side delivery primitive.
///
/// The relay is decoupled from any specific transport: whatever can push
/// one event to one connection can carry its traffic.
pub trait EventSink: Send + Sync {
    /// Deliver one event to one connection, best-effort.
    fn send_to(&self, connection: ConnectionId, event: OutboundEvent);
}

/// Error returned for an unusable location report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// Latitude or longitude out of range.
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// Speed or heading out of range.
    #[error(transparent)]
    InvalidSample(#[from] InvalidSample),
}

/// What a publish did, for observability and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResult {
    /// Whether the sample was applied (false when dropped as stale).
    pub accepted: bool,

    /// Connections the update was dispatched to.
    pub delivered: Vec<ConnectionId>,
}

/// A raw location report as it arrives from the transport layer.
#[derive(Debug, Clone)]
pub struct LocationUpdate {
    pub vehicle_id: VehicleId,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: Option<f64>,
    pub heading_degrees: Option<f64>,
    /// Device-supplied timestamp; the receipt time is used when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Accepts publisher traffic and fans it out to subscribers.
pub struct LocationRelay {
    registry: Arc<SubscriptionRegistry>,
    sink: Arc<dyn EventSink>,
}

impl LocationRelay {
    /// Create a relay over the given registry and delivery sink.
    pub fn new(registry: Arc<SubscriptionRegistry>, sink: Arc<dyn EventSink>) -> Self {
        Self { registry, sink }
    }

    /// Validate and record a location report, then fan the update out to
    /// every current subscriber of the vehicle.
    ///
    /// Invalid reports leave the registry untouched. Stale reports are
    /// dropped silently (`accepted == false`), with nothing dispatched.
    pub async fn publish_location(
        &self,
        connection: ConnectionId,
        update: LocationUpdate,
    ) -> Result<RelayResult, RelayError> {
        let coordinate = Coordinate::new(update.latitude, update.longitude)?;
        let sample = PositionSample::new(
            update.vehicle_id,
            coordinate,
            update.speed_kmh,
            update.heading_degrees,
            update.timestamp,
        )?;

        let event = OutboundEvent::location_update(&sample);
        let vehicle_id = sample.vehicle_id().clone();
        let outcome = self.registry.record_sample(connection, sample).await;

        if !outcome.accepted {
            debug!(%vehicle_id, %connection, "dropped stale sample");
            return Ok(RelayResult {
                accepted: false,
                delivered: Vec::new(),
            });
        }

        for subscriber in &outcome.subscribers {
            self.sink.send_to(*subscriber, event.clone());
        }

        Ok(RelayResult {
            accepted: true,
            delivered: outcome.subscribers,
        })
    }

    /// Claim the vehicle for `connection` and confirm to the caller only.
    pub async fn start_sharing(&self, connection: ConnectionId, vehicle_id: VehicleId) {
        self.registry.claim_publisher(&vehicle_id, connection).await;
        info!(%vehicle_id, %connection, "publisher claimed");
        self.sink
            .send_to(connection, OutboundEvent::sharing_started(&vehicle_id));
    }

    /// Release the vehicle if `connection` is its current publisher, and
    /// notify the vehicle's subscribers that it went offline.
    pub async fn stop_sharing(&self, connection: ConnectionId, vehicle_id: &VehicleId) {
        if !self.registry.release_vehicle(vehicle_id, connection).await {
            debug!(%vehicle_id, %connection, "stop-sharing ignored: not the current publisher");
            return;
        }

        info!(%vehicle_id, "vehicle offline");
        let event = OutboundEvent::offline(vehicle_id);
        for subscriber in self.registry.subscribers(vehicle_id).await {
            self.sink.send_to(subscriber, event.clone());
        }
    }

    /// Subscribe `connection` to a vehicle's updates.
    pub async fn track(&self, connection: ConnectionId, vehicle_id: VehicleId) {
        self.registry.subscribe(&vehicle_id, connection).await;
        debug!(%vehicle_id, %connection, "subscriber joined");
    }

    /// Unsubscribe `connection` from a vehicle's updates.
    pub async fn untrack(&self, connection: ConnectionId, vehicle_id: &VehicleId) {
        self.registry.unsubscribe(vehicle_id, connection).await;
        debug!(%vehicle_id, %connection, "subscriber left");
    }

    /// Tear down all state for a connection that went away.
    ///
    /// Every vehicle the connection was publishing goes offline (with
    /// notifications to its subscribers), and the connection leaves every
    /// subscriber set. Idempotent, and safe to run concurrently with a
    /// reconnect claiming the same vehicles: the registry checks the
    /// publisher identity under the vehicle lock, so a newer claim is
    /// never torn down and no phantom offline event is emitted.
    pub async fn on_disconnect(&self, connection: ConnectionId) {
        let affected = self.registry.release_publisher(connection).await;
        for vehicle_id in &affected {
            info!(%vehicle_id, %connection, "vehicle offline (publisher disconnected)");
            let event = OutboundEvent::offline(vehicle_id);
            for subscriber in self.registry.subscribers(vehicle_id).await {
                self.sink.send_to(subscriber, event.clone());
            }
        }
        self.registry.remove_subscriber_everywhere(connection).await;
    }
}
