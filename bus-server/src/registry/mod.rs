//! Subscription registry: who publishes each vehicle, and who is watching.
//!
//! The registry is the shared mutable state between the telemetry path
//! (publisher → subscribers) and the query path (proximity ranking). It is
//! constructed once per process and handed to every connection handler.
//!
//! Operations on the same vehicle are linearizable: the channel map takes a
//! read-write lock and each vehicle channel its own mutex, so concurrent
//! handlers never observe a partial update. No lock is ever held across
//! outbound delivery; callers snapshot subscriber sets and fan out
//! afterwards.

mod channel;
mod state;

pub use channel::VehicleSnapshot;
pub use state::{SampleOutcome, SubscriptionRegistry};
