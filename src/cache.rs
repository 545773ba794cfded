//! Time-bounded snapshot cache.
//!
//! Decouples the refresh producer from consumer reads. The published snapshot
//! lives behind an `Arc` pointer that is replaced in one swap, so readers
//! always see either the old snapshot or the new one, never a mix, and no
//! reader ever holds a lock while network I/O is in flight.
//!
//! In lazy mode, [`SnapshotCache::read_or_refresh`] enforces single-flight:
//! concurrent stale readers serialize on an async gate, and whoever acquires
//! it after a refresh completed re-checks freshness instead of refreshing
//! again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;

use crate::snapshot::Snapshot;

/// Shared cache holding the most recent snapshot and its TTL policy.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: chrono::Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl SnapshotCache {
    /// Create an empty cache with the given time-to-live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            current: RwLock::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Atomically replace the published snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        *self.current.write() = Some(Arc::new(snapshot));
    }

    /// The currently published snapshot, regardless of age.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// The published snapshot together with its current age.
    #[must_use]
    pub fn cached_with_age(&self) -> Option<(Arc<Snapshot>, chrono::Duration)> {
        let snapshot = self.cached()?;
        let age = snapshot.age(Utc::now());
        Some((snapshot, age))
    }

    /// The published snapshot, only if younger than the TTL.
    fn fresh(&self) -> Option<Arc<Snapshot>> {
        self.cached_with_age()
            .filter(|(_, age)| *age < self.ttl)
            .map(|(snapshot, _)| snapshot)
    }

    /// Return the cached snapshot, refreshing first when stale or empty.
    ///
    /// At most one refresh is in flight at a time: callers that arrive while
    /// one runs wait for it and then take its result. `refresh` is only
    /// invoked by the caller that actually performs the refresh.
    pub async fn read_or_refresh<F, Fut>(&self, refresh: F) -> Arc<Snapshot>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Snapshot>,
    {
        if let Some(snapshot) = self.fresh() {
            return snapshot;
        }

        let _gate = self.refresh_gate.lock().await;

        // Someone else may have refreshed while we waited on the gate.
        if let Some(snapshot) = self.fresh() {
            return snapshot;
        }

        let snapshot = Arc::new(refresh().await);
        *self.current.write() = Some(Arc::clone(&snapshot));
        snapshot
    }
}
