//! Nearest-vehicle ranking for stop queries.
//!
//! Answers "which buses are closest to this stop right now?" from the
//! registry's online-vehicle snapshot. Pure computation: no shared state,
//! no side effects.

use std::cmp::Ordering;

use crate::domain::{PositionSample, Stop, VehicleId};
use crate::geo::{self, DEFAULT_AVERAGE_SPEED_KMH};
use crate::registry::VehicleSnapshot;

/// A vehicle ranked against a stop. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedVehicle {
    /// The ranked vehicle.
    pub vehicle_id: VehicleId,

    /// Great-circle distance to the stop, rounded to 2 decimal places.
    pub distance_km: f64,

    /// Straight-line ETA at the assumed average speed, whole minutes.
    pub eta_minutes: u32,

    /// The position the ranking was computed from.
    pub last_known_position: PositionSample,
}

/// Rank candidate vehicles by distance from a stop, nearest first.
///
/// Candidates without a last known position are excluded: a claimed
/// vehicle that has not sent a sample yet cannot be ranked. Ties on the
/// (rounded) distance break by vehicle id ascending, so the ordering is
/// deterministic. The full ranked list is returned; pagination is the
/// caller's concern. An empty candidate list yields an empty result.
pub fn rank_vehicles_near_stop(stop: &Stop, candidates: Vec<VehicleSnapshot>) -> Vec<RankedVehicle> {
    let mut ranked: Vec<RankedVehicle> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let position = candidate.last_known_position?;
            let distance = geo::distance_km(stop.coordinate(), position.coordinate());
            // The default speed is a positive constant, so the ETA
            // computation cannot fail.
            let eta_minutes = geo::eta_minutes(distance, DEFAULT_AVERAGE_SPEED_KMH).unwrap_or(0);
            Some(RankedVehicle {
                vehicle_id: candidate.vehicle_id,
                distance_km: round_2dp(distance),
                eta_minutes,
                last_known_position: position,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
    });

    ranked
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
