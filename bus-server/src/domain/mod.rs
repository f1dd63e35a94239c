//! Domain types for the bus tracking relay.
//!
//! This module contains the core domain model types that represent
//! validated tracking data. All types enforce their invariants at
//! construction time, so code that receives these types can trust
//! their validity.

mod connection;
mod coordinate;
mod sample;
mod stop;
mod vehicle;

pub use connection::ConnectionId;
pub use coordinate::{Coordinate, InvalidCoordinate};
pub use sample::{InvalidSample, PositionSample};
pub use stop::{InvalidStopCode, Stop, StopCode};
pub use vehicle::{InvalidVehicleId, VehicleId};
