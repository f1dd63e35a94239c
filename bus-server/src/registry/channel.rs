//! Per-vehicle live state.

use std::collections::HashSet;

use crate::domain::{ConnectionId, PositionSample, VehicleId};

/// The live, mutable record for one vehicle.
///
/// Created lazily on first publish or first subscribe; the registry drops
/// the record once the publisher slot and subscriber set are both empty.
#[derive(Debug, Default)]
pub(crate) struct VehicleChannel {
    /// The connection currently claiming to publish this vehicle.
    /// At most one at any instant; claims are last-writer-wins.
    pub publisher: Option<ConnectionId>,

    /// Most recent accepted sample, if any.
    pub last_known_position: Option<PositionSample>,

    /// Connections receiving this vehicle's fan-out events.
    pub subscribers: HashSet<ConnectionId>,
}

impl VehicleChannel {
    /// True once nothing references the channel any more.
    pub fn is_idle(&self) -> bool {
        self.publisher.is_none() && self.subscribers.is_empty()
    }

    /// Apply a sample under the monotonicity rule: a strictly older sample
    /// never overwrites a newer one. Returns whether the sample was
    /// applied.
    pub fn apply_sample(&mut self, sample: PositionSample) -> bool {
        if let Some(current) = &self.last_known_position {
            if sample.timestamp() < current.timestamp() {
                return false;
            }
        }
        self.last_known_position = Some(sample);
        true
    }
}

/// Read-only view of one vehicle, used as ranking input.
#[derive(Debug, Clone)]
pub struct VehicleSnapshot {
    /// The vehicle this snapshot describes.
    pub vehicle_id: VehicleId,

    /// Cached last position; absent until the first accepted sample.
    pub last_known_position: Option<PositionSample>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use chrono::{DateTime, Utc};

    fn sample(ts: &str) -> PositionSample {
        PositionSample::new(
            VehicleId::parse("BUS-1").unwrap(),
            Coordinate::new(1.0, 2.0).unwrap(),
            None,
            None,
            Some(ts.parse::<DateTime<Utc>>().unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn newer_sample_overwrites() {
        let mut channel = VehicleChannel::default();
        assert!(channel.apply_sample(sample("2026-01-01T10:00:00Z")));
        assert!(channel.apply_sample(sample("2026-01-01T10:00:05Z")));
        let current = channel.last_known_position.as_ref().unwrap();
        assert_eq!(
            current.timestamp(),
            "2026-01-01T10:00:05Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn stale_sample_rejected() {
        let mut channel = VehicleChannel::default();
        assert!(channel.apply_sample(sample("2026-01-01T10:00:05Z")));
        assert!(!channel.apply_sample(sample("2026-01-01T10:00:00Z")));
        let current = channel.last_known_position.as_ref().unwrap();
        assert_eq!(
            current.timestamp(),
            "2026-01-01T10:00:05Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn equal_timestamp_overwrites() {
        // Receipt-order wins on a timestamp tie.
        let mut channel = VehicleChannel::default();
        assert!(channel.apply_sample(sample("2026-01-01T10:00:00Z")));
        assert!(channel.apply_sample(sample("2026-01-01T10:00:00Z")));
    }

    #[test]
    fn idle_only_when_fully_empty() {
        let mut channel = VehicleChannel::default();
        assert!(channel.is_idle());

        channel.publisher = Some(ConnectionId::new(1));
        assert!(!channel.is_idle());

        channel.publisher = None;
        channel.subscribers.insert(ConnectionId::new(2));
        assert!(!channel.is_idle());
    }
}
