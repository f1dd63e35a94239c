//! Live connection tracking for outbound delivery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::ConnectionId;
use crate::relay::{EventSink, OutboundEvent};

/// Registry of live transport connections.
///
/// Maps each connection to the queue its WebSocket writer task drains.
/// This is the [`EventSink`] the relay fans out through: a send is just a
/// queue push, so the relay never blocks on a slow socket.
#[derive(Clone, Default)]
pub struct ConnectionMap {
    senders: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<OutboundEvent>>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionMap {
    /// Create an empty connection map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection, returning its id and the receiving end
    /// of its outbound queue.
    ///
    /// The map lock is only ever held for a map operation, none of which
    /// panic, so poisoning indicates a bug and aborts rather than handing
    /// out a connection that can never receive events.
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<OutboundEvent>) {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .write()
            .expect("connection map lock poisoned")
            .insert(id, tx);
        (id, rx)
    }

    /// Drop a connection's outbound queue. Events sent to the id after
    /// this point are discarded.
    pub fn unregister(&self, connection: ConnectionId) {
        self.senders
            .write()
            .expect("connection map lock poisoned")
            .remove(&connection);
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.senders
            .read()
            .expect("connection map lock poisoned")
            .len()
    }

    /// Check if no connections are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for ConnectionMap {
    fn send_to(&self, connection: ConnectionId, event: OutboundEvent) {
        let sender = self
            .senders
            .read()
            .expect("connection map lock poisoned")
            .get(&connection)
            .cloned();
        match sender {
            Some(sender) => {
                // The receiver side only closes when the socket does;
                // delivery is best-effort, so a closing connection just
                // misses the event.
                if sender.send(event).is_err() {
                    debug!(%connection, "dropped event for closing connection");
                }
            }
            None => debug!(%connection, "dropped event for unknown connection"),
        }
    }
}
