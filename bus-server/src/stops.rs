//! Stop directory lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Stop, StopCode};

/// Thread-safe stop lookup.
///
/// The system of record for stops is an external document store; this is
/// the in-process view the ranking endpoints read from. Cloning the
/// directory shares the underlying map.
#[derive(Clone, Default)]
pub struct StopDirectory {
    inner: Arc<RwLock<HashMap<StopCode, Stop>>>,
}

impl StopDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stop by its code.
    pub async fn get(&self, code: &StopCode) -> Option<Stop> {
        let guard = self.inner.read().await;
        guard.get(code).cloned()
    }

    /// Insert or replace a stop. Returns true when the code was not
    /// present before.
    pub async fn insert(&self, stop: Stop) -> bool {
        let mut guard = self.inner.write().await;
        guard.insert(stop.code().clone(), stop).is_none()
    }

    /// Remove a stop, returning it if it was present.
    pub async fn remove(&self, code: &StopCode) -> Option<Stop> {
        let mut guard = self.inner.write().await;
        guard.remove(code)
    }

    /// Number of stops in the directory.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    /// Check if the directory is empty.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_empty()
    }
}
