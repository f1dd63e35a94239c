//! The registry itself.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::{ConnectionId, PositionSample, VehicleId};

use super::channel::{VehicleChannel, VehicleSnapshot};

/// Result of recording a position sample.
#[derive(Debug, Clone)]
pub struct SampleOutcome {
    /// Whether the sample was applied (false for stale samples).
    pub accepted: bool,

    /// Subscriber snapshot taken in the same critical section, for fan-out
    /// after the channel lock is released.
    pub subscribers: Vec<ConnectionId>,
}

/// Tracks which connection publishes each vehicle and which connections
/// subscribe to it.
///
/// All operations are local and infallible: there is no I/O behind any of
/// them. Mutations on one vehicle are serialized by that vehicle's lock;
/// operations on different vehicles proceed concurrently. Channel creation
/// and removal are serialized by the map lock, so a claim can never land on
/// a channel that a concurrent cleanup is removing.
pub struct SubscriptionRegistry {
    channels: RwLock<HashMap<VehicleId, Arc<Mutex<VehicleChannel>>>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Run `mutate` against the channel for `vehicle_id`, creating the
    /// channel when absent. The map lock is held for the duration so the
    /// channel cannot be removed out from under the mutation.
    async fn with_channel<T>(
        &self,
        vehicle_id: &VehicleId,
        mutate: impl FnOnce(&mut VehicleChannel) -> T,
    ) -> T {
        {
            let map = self.channels.read().await;
            if let Some(channel) = map.get(vehicle_id) {
                let mut guard = channel.lock().await;
                return mutate(&mut guard);
            }
        }

        let mut map = self.channels.write().await;
        let channel = Arc::clone(
            map.entry(vehicle_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(VehicleChannel::default()))),
        );
        let mut guard = channel.lock().await;
        mutate(&mut guard)
    }

    /// Like [`Self::with_channel`], but a no-op returning `None` when the
    /// channel does not exist.
    async fn with_existing_channel<T>(
        &self,
        vehicle_id: &VehicleId,
        mutate: impl FnOnce(&mut VehicleChannel) -> T,
    ) -> Option<T> {
        let map = self.channels.read().await;
        let channel = map.get(vehicle_id)?;
        let mut guard = channel.lock().await;
        Some(mutate(&mut guard))
    }

    /// Drop the channel entry once nothing references it any more.
    async fn remove_if_idle(&self, vehicle_id: &VehicleId) {
        let mut map = self.channels.write().await;
        let Some(channel) = map.get(vehicle_id) else {
            return;
        };
        let idle = channel.lock().await.is_idle();
        if idle {
            map.remove(vehicle_id);
        }
    }

    /// Claim `connection` as the publisher for `vehicle_id`, creating the
    /// channel when absent.
    ///
    /// Overwrite semantics: a claim from a different connection silently
    /// replaces the previous publisher. The prior publisher is not
    /// notified.
    pub async fn claim_publisher(&self, vehicle_id: &VehicleId, connection: ConnectionId) {
        self.with_channel(vehicle_id, |channel| {
            channel.publisher = Some(connection);
        })
        .await;
    }

    /// Clear the publisher slot of every channel published by
    /// `connection`, returning the affected vehicles.
    ///
    /// The publisher identity is checked under each channel's lock, so a
    /// vehicle that a newer connection has already re-claimed is left
    /// untouched and does not appear in the result.
    pub async fn release_publisher(&self, connection: ConnectionId) -> Vec<VehicleId> {
        let mut affected = Vec::new();
        {
            let map = self.channels.read().await;
            for (vehicle_id, channel) in map.iter() {
                let mut guard = channel.lock().await;
                if guard.publisher == Some(connection) {
                    guard.publisher = None;
                    affected.push(vehicle_id.clone());
                }
            }
        }
        for vehicle_id in &affected {
            self.remove_if_idle(vehicle_id).await;
        }
        affected
    }

    /// Single-vehicle release for stop-sharing. Returns whether the
    /// publisher slot was actually cleared; false (and no state change)
    /// when `connection` is not the current publisher.
    pub async fn release_vehicle(
        &self,
        vehicle_id: &VehicleId,
        connection: ConnectionId,
    ) -> bool {
        let released = self
            .with_existing_channel(vehicle_id, |channel| {
                if channel.publisher == Some(connection) {
                    channel.publisher = None;
                    true
                } else {
                    false
                }
            })
            .await
            .unwrap_or(false);

        if released {
            self.remove_if_idle(vehicle_id).await;
        }
        released
    }

    /// Add `connection` to the vehicle's subscriber set, creating the
    /// channel when absent. Idempotent.
    pub async fn subscribe(&self, vehicle_id: &VehicleId, connection: ConnectionId) {
        self.with_channel(vehicle_id, |channel| {
            channel.subscribers.insert(connection);
        })
        .await;
    }

    /// Remove `connection` from the vehicle's subscriber set. Idempotent;
    /// a no-op for unknown vehicles.
    pub async fn unsubscribe(&self, vehicle_id: &VehicleId, connection: ConnectionId) {
        let removed = self
            .with_existing_channel(vehicle_id, |channel| {
                channel.subscribers.remove(&connection)
            })
            .await
            .unwrap_or(false);

        if removed {
            self.remove_if_idle(vehicle_id).await;
        }
    }

    /// Remove `connection` from every channel's subscriber set. Used on
    /// disconnect.
    pub async fn remove_subscriber_everywhere(&self, connection: ConnectionId) {
        let mut touched = Vec::new();
        {
            let map = self.channels.read().await;
            for (vehicle_id, channel) in map.iter() {
                let mut guard = channel.lock().await;
                if guard.subscribers.remove(&connection) {
                    touched.push(vehicle_id.clone());
                }
            }
        }
        for vehicle_id in &touched {
            self.remove_if_idle(vehicle_id).await;
        }
    }

    /// Record a position sample from `connection`.
    ///
    /// Auto-claim: the channel is created if needed and `connection`
    /// becomes the publisher, so legitimate first-time telemetry is never
    /// dropped. An accepted sample from a different connection re-claims
    /// the vehicle under the same last-writer-wins rule as
    /// [`Self::claim_publisher`]. Stale samples (older than the current
    /// position) are rejected without error and leave the publisher slot
    /// untouched, so a rejected replay cannot displace a live publisher.
    pub async fn record_sample(
        &self,
        connection: ConnectionId,
        sample: PositionSample,
    ) -> SampleOutcome {
        let vehicle_id = sample.vehicle_id().clone();
        self.with_channel(&vehicle_id, |channel| {
            let accepted = channel.apply_sample(sample);
            if accepted {
                channel.publisher = Some(connection);
            }
            SampleOutcome {
                accepted,
                subscribers: channel.subscribers.iter().copied().collect(),
            }
        })
        .await
    }

    /// True iff a publisher is currently claimed for the vehicle.
    pub async fn is_online(&self, vehicle_id: &VehicleId) -> bool {
        self.with_existing_channel(vehicle_id, |channel| channel.publisher.is_some())
            .await
            .unwrap_or(false)
    }

    /// Subscriber snapshot for a vehicle. Empty for unknown vehicles.
    pub async fn subscribers(&self, vehicle_id: &VehicleId) -> Vec<ConnectionId> {
        self.with_existing_channel(vehicle_id, |channel| {
            channel.subscribers.iter().copied().collect()
        })
        .await
        .unwrap_or_default()
    }

    /// Snapshot every vehicle with a claimed publisher, with its cached
    /// position. This is the candidate list the proximity ranker consumes.
    pub async fn online_vehicles(&self) -> Vec<VehicleSnapshot> {
        let map = self.channels.read().await;
        let mut snapshots = Vec::with_capacity(map.len());
        for (vehicle_id, channel) in map.iter() {
            let guard = channel.lock().await;
            if guard.publisher.is_some() {
                snapshots.push(VehicleSnapshot {
                    vehicle_id: vehicle_id.clone(),
                    last_known_position: guard.last_known_position.clone(),
                });
            }
        }
        snapshots
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use chrono::{DateTime, Utc};

    fn bus(id: &str) -> VehicleId {
        VehicleId::parse(id).unwrap()
    }

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn sample(vehicle: &str, ts: Option<&str>) -> PositionSample {
        PositionSample::new(
            bus(vehicle),
            Coordinate::new(10.0, 20.0).unwrap(),
            Some(30.0),
            None,
            ts.map(|t| t.parse::<DateTime<Utc>>().unwrap()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn claim_makes_vehicle_online() {
        let registry = SubscriptionRegistry::new();
        assert!(!registry.is_online(&bus("BUS-1")).await);

        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;
        assert!(registry.is_online(&bus("BUS-1")).await);
    }

    #[tokio::test]
    async fn release_publisher_returns_affected_vehicles() {
        let registry = SubscriptionRegistry::new();
        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;
        registry.claim_publisher(&bus("BUS-2"), conn(1)).await;
        registry.claim_publisher(&bus("BUS-3"), conn(2)).await;

        let mut affected = registry.release_publisher(conn(1)).await;
        affected.sort();
        assert_eq!(affected, vec![bus("BUS-1"), bus("BUS-2")]);

        assert!(!registry.is_online(&bus("BUS-1")).await);
        assert!(registry.is_online(&bus("BUS-3")).await);
    }

    #[tokio::test]
    async fn release_publisher_is_a_noop_for_non_publishers() {
        let registry = SubscriptionRegistry::new();
        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;

        assert!(registry.release_publisher(conn(99)).await.is_empty());
        assert!(registry.is_online(&bus("BUS-1")).await);
    }

    #[tokio::test]
    async fn reclaim_shields_vehicle_from_old_publisher_release() {
        // A claims, B re-claims, then A's disconnect must not tear the
        // vehicle down or report it as affected.
        let registry = SubscriptionRegistry::new();
        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;
        registry.claim_publisher(&bus("BUS-1"), conn(2)).await;

        let affected = registry.release_publisher(conn(1)).await;
        assert!(affected.is_empty());
        assert!(registry.is_online(&bus("BUS-1")).await);
    }

    #[tokio::test]
    async fn subscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(&bus("BUS-1"), conn(5)).await;
        registry.subscribe(&bus("BUS-1"), conn(5)).await;

        assert_eq!(registry.subscribers(&bus("BUS-1")).await, vec![conn(5)]);
    }

    #[tokio::test]
    async fn unsubscribe_restores_prior_state() {
        let registry = SubscriptionRegistry::new();
        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;
        let before = registry.subscribers(&bus("BUS-1")).await;

        registry.subscribe(&bus("BUS-1"), conn(5)).await;
        registry.unsubscribe(&bus("BUS-1"), conn(5)).await;

        assert_eq!(registry.subscribers(&bus("BUS-1")).await, before);
        // And again: unsubscribe of an absent subscriber is a no-op.
        registry.unsubscribe(&bus("BUS-1"), conn(5)).await;
        assert_eq!(registry.subscribers(&bus("BUS-1")).await, before);
    }

    #[tokio::test]
    async fn remove_subscriber_everywhere_clears_all_sets() {
        let registry = SubscriptionRegistry::new();
        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;
        registry.claim_publisher(&bus("BUS-2"), conn(2)).await;
        registry.subscribe(&bus("BUS-1"), conn(5)).await;
        registry.subscribe(&bus("BUS-2"), conn(5)).await;
        registry.subscribe(&bus("BUS-2"), conn(6)).await;

        registry.remove_subscriber_everywhere(conn(5)).await;

        assert!(registry.subscribers(&bus("BUS-1")).await.is_empty());
        assert_eq!(registry.subscribers(&bus("BUS-2")).await, vec![conn(6)]);
    }

    #[tokio::test]
    async fn record_sample_auto_claims() {
        let registry = SubscriptionRegistry::new();
        let outcome = registry.record_sample(conn(1), sample("BUS-1", None)).await;

        assert!(outcome.accepted);
        assert!(outcome.subscribers.is_empty());
        assert!(registry.is_online(&bus("BUS-1")).await);
    }

    #[tokio::test]
    async fn record_sample_returns_subscriber_snapshot() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(&bus("BUS-1"), conn(5)).await;
        registry.subscribe(&bus("BUS-1"), conn(6)).await;

        let outcome = registry.record_sample(conn(1), sample("BUS-1", None)).await;
        assert!(outcome.accepted);
        let mut subscribers = outcome.subscribers;
        subscribers.sort();
        assert_eq!(subscribers, vec![conn(5), conn(6)]);
    }

    #[tokio::test]
    async fn stale_sample_rejected_without_rollback() {
        let registry = SubscriptionRegistry::new();
        let newer = sample("BUS-1", Some("2026-01-01T10:00:05Z"));
        let older = sample("BUS-1", Some("2026-01-01T10:00:00Z"));

        assert!(registry.record_sample(conn(1), newer).await.accepted);
        assert!(!registry.record_sample(conn(1), older).await.accepted);

        let snapshots = registry.online_vehicles().await;
        let position = snapshots[0].last_known_position.as_ref().unwrap();
        assert_eq!(
            position.timestamp(),
            "2026-01-01T10:00:05Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[tokio::test]
    async fn rejected_stale_sample_does_not_steal_publishership() {
        let registry = SubscriptionRegistry::new();
        let live = sample("BUS-1", Some("2026-01-01T10:00:05Z"));
        let replay = sample("BUS-1", Some("2026-01-01T10:00:00Z"));

        assert!(registry.record_sample(conn(1), live).await.accepted);
        assert!(!registry.record_sample(conn(2), replay).await.accepted);

        // The stray connection never became publisher, so its departure
        // affects nothing and the live publisher's does.
        assert!(registry.release_publisher(conn(2)).await.is_empty());
        assert!(registry.is_online(&bus("BUS-1")).await);
        assert_eq!(
            registry.release_publisher(conn(1)).await,
            vec![bus("BUS-1")]
        );
    }

    #[tokio::test]
    async fn online_vehicles_excludes_released() {
        let registry = SubscriptionRegistry::new();
        registry.record_sample(conn(1), sample("BUS-1", None)).await;
        registry.record_sample(conn(2), sample("BUS-2", None)).await;
        registry.release_vehicle(&bus("BUS-2"), conn(2)).await;

        let snapshots = registry.online_vehicles().await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].vehicle_id, bus("BUS-1"));
    }

    #[tokio::test]
    async fn release_vehicle_checks_publisher_identity() {
        let registry = SubscriptionRegistry::new();
        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;

        assert!(!registry.release_vehicle(&bus("BUS-1"), conn(2)).await);
        assert!(registry.is_online(&bus("BUS-1")).await);

        assert!(registry.release_vehicle(&bus("BUS-1"), conn(1)).await);
        assert!(!registry.is_online(&bus("BUS-1")).await);
    }

    #[tokio::test]
    async fn idle_channels_are_removed() {
        let registry = SubscriptionRegistry::new();
        registry.claim_publisher(&bus("BUS-1"), conn(1)).await;
        registry.subscribe(&bus("BUS-1"), conn(5)).await;

        registry.release_vehicle(&bus("BUS-1"), conn(1)).await;
        // Still referenced by a subscriber.
        assert_eq!(registry.channel_count().await, 1);

        registry.unsubscribe(&bus("BUS-1"), conn(5)).await;
        assert_eq!(registry.channel_count().await, 0);
    }

    #[tokio::test]
    async fn concurrent_samples_for_distinct_vehicles() {
        let registry = Arc::new(SubscriptionRegistry::new());

        let mut handles = Vec::new();
        for i in 0..8u64 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let vehicle = format!("BUS-{i}");
                for _ in 0..50 {
                    registry.record_sample(conn(i), sample(&vehicle, None)).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.online_vehicles().await.len(), 8);
    }
}

#[cfg(test)]
impl SubscriptionRegistry {
    /// Number of live channels, for tests asserting cleanup.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}
