use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::{cycler::WindowCycler, ops::ProcessOps};

/// Per-process cycler registry, owned by the switch controller.
///
/// Lookup and creation are a short lock on the map; each cycler sits behind
/// its own async mutex so a whole cycle operation (including its delays)
/// holds exactly one per-pid lock, serializing overlapping presses for the
/// same process. Entries for processes that have exited are evicted on each
/// activation pass.
#[derive(Default)]
pub struct CyclerStore {
    inner: Mutex<HashMap<i32, Arc<AsyncMutex<WindowCycler>>>>,
}

impl CyclerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cycler for a pid, creating it lazily on first request.
    pub fn entry(&self, pid: i32) -> Arc<AsyncMutex<WindowCycler>> {
        let mut map = self.inner.lock();
        map.entry(pid)
            .or_insert_with(|| {
                debug!(pid, "creating window cycler");
                Arc::new(AsyncMutex::new(WindowCycler::new(pid)))
            })
            .clone()
    }

    /// Drop cyclers whose process is no longer running.
    pub fn evict_dead(&self, procs: &dyn ProcessOps) {
        let mut map = self.inner.lock();
        let before = map.len();
        map.retain(|pid, _| procs.is_running(*pid));
        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, "evicted cyclers for exited processes");
        }
    }

    /// Number of live cyclers.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Whether a cycler exists for this pid.
    pub fn contains(&self, pid: i32) -> bool {
        self.inner.lock().contains_key(&pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockProcs;

    #[test]
    fn entry_is_lazy_and_stable() {
        let store = CyclerStore::new();
        assert!(store.is_empty());
        let a = store.entry(42);
        let b = store.entry(42);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn evicts_only_dead_pids() {
        let procs = MockProcs::new();
        procs.add_running("com.example.editor", 10);
        let store = CyclerStore::new();
        let _ = store.entry(10);
        let _ = store.entry(11);
        store.evict_dead(&procs);
        assert!(store.contains(10));
        assert!(!store.contains(11));
    }
}
