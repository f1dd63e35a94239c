//! Real-time bus location relay server.
//!
//! Drivers publish their bus's position over a WebSocket; passengers
//! subscribe to buses they care about, or scan a stop code to see the
//! nearest live buses with distance and ETA.

pub mod domain;
pub mod geo;
pub mod ranking;
pub mod registry;
pub mod relay;
pub mod stops;
pub mod web;
