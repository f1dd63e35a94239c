//! Application state for the web layer.

use std::sync::Arc;

use crate::registry::SubscriptionRegistry;
use crate::relay::LocationRelay;
use crate::stops::StopDirectory;

use super::connections::ConnectionMap;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// The relay core handling telemetry and lifecycle events.
    pub relay: Arc<LocationRelay>,

    /// Shared publish/subscribe state, read directly for queries.
    pub registry: Arc<SubscriptionRegistry>,

    /// Stop lookup for proximity queries.
    pub stops: StopDirectory,

    /// Live connections and their outbound queues.
    pub connections: ConnectionMap,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        relay: Arc<LocationRelay>,
        registry: Arc<SubscriptionRegistry>,
        stops: StopDirectory,
        connections: ConnectionMap,
    ) -> Self {
        Self {
            relay,
            registry,
            stops,
            connections,
        }
    }
}
