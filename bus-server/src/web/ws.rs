//! WebSocket transport for the relay.
//!
//! Each socket gets a connection id and an outbound queue on upgrade. A
//! writer task drains the queue to the socket; the reader loop parses
//! inbound events and dispatches them to the relay. When the socket goes
//! away, for any reason, the relay's disconnect cleanup runs exactly as
//! if the client had said goodbye.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use crate::domain::{ConnectionId, VehicleId};
use crate::relay::{EventSink, LocationUpdate, OutboundEvent};

use super::dto::InboundEvent;
use super::state::AppState;

/// Upgrade handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one connection until it closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (connection, mut outbound) = state.connections.register();
    debug!(%connection, "socket connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer: drain the outbound queue into the socket. Ends when the
    // queue closes (unregister) or the peer stops accepting writes.
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Reader: dispatch inbound events until the socket closes.
    while let Some(message) = ws_rx.next().await {
        match message {
            Ok(Message::Text(text)) => handle_event(&state, connection, &text).await,
            Ok(Message::Close(_)) | Err(_) => break,
            // Ping/pong and binary frames carry no events.
            Ok(_) => {}
        }
    }

    state.relay.on_disconnect(connection).await;
    state.connections.unregister(connection);
    writer.abort();
    debug!(%connection, "socket disconnected");
}

/// Parse and dispatch one inbound event.
///
/// Malformed or invalid events are answered with an `error` event on the
/// offending connection and otherwise ignored; the connection stays up.
async fn handle_event(state: &AppState, connection: ConnectionId, text: &str) {
    let event: InboundEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(%connection, error = %e, "malformed inbound event");
            state
                .connections
                .send_to(connection, OutboundEvent::error(format!("malformed event: {e}")));
            return;
        }
    };

    match event {
        InboundEvent::StartSharing {
            vehicle_id,
            driver_id,
        } => {
            let Some(vehicle_id) = parse_vehicle(state, connection, &vehicle_id) else {
                return;
            };
            if let Some(driver_id) = driver_id {
                info!(%vehicle_id, %driver_id, "driver started sharing");
            }
            state.relay.start_sharing(connection, vehicle_id).await;
        }

        InboundEvent::LocationUpdate {
            vehicle_id,
            latitude,
            longitude,
            speed,
            heading,
        } => {
            let Some(vehicle_id) = parse_vehicle(state, connection, &vehicle_id) else {
                return;
            };
            let update = LocationUpdate {
                vehicle_id,
                latitude,
                longitude,
                speed_kmh: speed,
                heading_degrees: heading,
                timestamp: None,
            };
            if let Err(e) = state.relay.publish_location(connection, update).await {
                state
                    .connections
                    .send_to(connection, OutboundEvent::error(e.to_string()));
            }
        }

        InboundEvent::TrackBus { vehicle_id } => {
            let Some(vehicle_id) = parse_vehicle(state, connection, &vehicle_id) else {
                return;
            };
            state.relay.track(connection, vehicle_id).await;
        }

        InboundEvent::UntrackBus { vehicle_id } => {
            let Some(vehicle_id) = parse_vehicle(state, connection, &vehicle_id) else {
                return;
            };
            state.relay.untrack(connection, &vehicle_id).await;
        }

        InboundEvent::StopSharing { vehicle_id } => {
            let Some(vehicle_id) = parse_vehicle(state, connection, &vehicle_id) else {
                return;
            };
            state.relay.stop_sharing(connection, &vehicle_id).await;
        }
    }
}

/// Parse a vehicle id, reporting failures back to the connection.
fn parse_vehicle(state: &AppState, connection: ConnectionId, raw: &str) -> Option<VehicleId> {
    match VehicleId::parse(raw) {
        Ok(vehicle_id) => Some(vehicle_id),
        Err(e) => {
            state
                .connections
                .send_to(connection, OutboundEvent::error(e.to_string()));
            None
        }
    }
}
