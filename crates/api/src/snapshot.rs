//! Latest assembled dashboard, shared between the refresh loop and handlers.
//!
//! Each refresh produces a whole new [`Dashboard`]; the store swaps the
//! pointer so readers always see a complete run, never a partial one.

use std::sync::Arc;

use chrono::Utc;
use plugdash_core::types::Timestamp;
use plugdash_pipeline::dashboard::Dashboard;
use tokio::sync::RwLock;

/// A dashboard together with the time it was stored.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub dashboard: Arc<Dashboard>,
    pub refreshed_at: Timestamp,
}

/// Holds the most recent [`Snapshot`], or nothing before the first refresh.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: RwLock<Option<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly assembled dashboard.
    pub async fn replace(&self, dashboard: Dashboard) {
        let snapshot = Snapshot {
            dashboard: Arc::new(dashboard),
            refreshed_at: Utc::now(),
        };
        *self.inner.write().await = Some(snapshot);
    }

    /// The latest snapshot, if any refresh has completed.
    pub async fn current(&self) -> Option<Snapshot> {
        self.inner.read().await.clone()
    }
}
