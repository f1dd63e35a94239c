//! Web layer for the bus tracking relay.
//!
//! Provides the WebSocket transport the relay core runs over, plus the
//! thin HTTP surface for health checks, stop CRUD and nearest-bus
//! queries.

mod connections;
mod dto;
mod routes;
mod state;
mod ws;

pub use connections::ConnectionMap;
pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
