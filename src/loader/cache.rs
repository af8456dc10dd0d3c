//! Latest-snapshot cache management

use std::sync::{Arc, RwLock};
use serde_json::Value;
use time::OffsetDateTime;
use super::snapshot::Snapshot;

/// A completed snapshot and the moment it was stored
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub snapshot: Arc<Snapshot>,
    pub updated_at: OffsetDateTime,
}

/// Holds exactly one snapshot, the latest, shared between the loader and
/// its readers (render callback, HTTP API).
///
/// The snapshot is swapped as a whole `Arc`, so a reader gets either the
/// previous complete snapshot or the new one.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    current: RwLock<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Replace the cached snapshot (called by the loader once a cycle completes)
    pub fn replace(&self, snapshot: Arc<Snapshot>) {
        let entry = CachedSnapshot {
            snapshot,
            updated_at: OffsetDateTime::now_utc(),
        };
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(entry);
    }

    /// The current snapshot with its timestamp
    pub fn current(&self) -> Option<CachedSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current().map(|c| c.snapshot)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.snapshot().and_then(|s| s.get(name).cloned())
    }

    pub fn get_agent(&self, id: &str) -> Option<Value> {
        self.snapshot().and_then(|s| s.get_agent(id).cloned())
    }

    pub fn last_update(&self) -> Option<OffsetDateTime> {
        self.current().map(|c| c.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ResourceTarget;
    use serde_json::json;

    #[test]
    fn test_empty_cache_reads_none() {
        let cache = SnapshotCache::new();
        assert!(cache.get("status").is_none());
        assert!(cache.get_agent("main").is_none());
        assert!(cache.last_update().is_none());
        assert!(cache.snapshot().is_none());
    }

    #[test]
    fn test_replace_swaps_whole_snapshot() {
        let cache = SnapshotCache::new();

        let mut first = Snapshot::new(1);
        first.insert(ResourceTarget::Resource("status".to_string()), Ok(json!({"v": 1})));
        cache.replace(Arc::new(first));
        let held = cache.snapshot().unwrap();

        let mut second = Snapshot::new(2);
        second.insert(ResourceTarget::Resource("tasks".to_string()), Ok(json!([])));
        let second = Arc::new(second);
        cache.replace(second.clone());

        // the old reader keeps its complete view
        assert_eq!(held.get("status"), Some(&json!({"v": 1})));
        assert!(Arc::ptr_eq(&cache.snapshot().unwrap(), &second));
        assert!(cache.get("status").is_none());
        assert_eq!(cache.get("tasks"), Some(json!([])));
        assert!(cache.last_update().is_some());
    }
}
