//! Transport connection identifier.

use std::fmt;

/// Identifier for one live transport connection.
///
/// Assigned by the transport layer when a connection is accepted, and
/// opaque everywhere else. Two connections never share an id within one
/// process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw transport-assigned id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
