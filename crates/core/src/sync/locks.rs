//! Per-scope serialization of reconciliation passes

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per scope code.
///
/// Two passes over the same scope would both read the same checkpoint and
/// race on the write. Passes over different scopes run concurrently.
/// A scope's entry is dropped once nobody holds or waits on it.
#[derive(Debug, Default)]
pub struct ScopeLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `code`.
    pub async fn acquire(&self, code: &str) -> ScopeGuard<'_> {
        // Cloned under the shard lock, so a concurrent release sees the waiter.
        let lock = self.locks.entry(code.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        ScopeGuard { locks: &self.locks, code: code.to_string(), guard: Some(guard) }
    }

    /// Scopes currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one scope, released on drop.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    code: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        // Unlock first; the map then holds the only reference when idle.
        drop(self.guard.take());
        self.locks.remove_if(&self.code, |_, lock| Arc::strong_count(lock) == 1);
    }
}
