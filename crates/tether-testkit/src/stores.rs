//! Instrumented key-value stores

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::{KeyValueStore, MemoryStore, Result, TetherError};

/// Memory store that counts and remembers writes. Clones share state.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: Arc<AtomicUsize>,
    last_write: Arc<Mutex<Option<(String, String)>>>,
}

impl CountingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_item` calls
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Key and value of the latest `set_item`
    pub fn last_write(&self) -> Option<(String, String)> {
        self.last_write.lock().clone()
    }

    /// The backing memory store
    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for CountingStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.last_write.lock() = Some((key.to_string(), value.to_string()));
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<bool> {
        self.inner.remove_item(key)
    }
}

/// Store whose writes fail once a write budget is spent.
///
/// Reads and removals go to an inner memory store.
#[derive(Clone)]
pub struct FailingStore {
    inner: MemoryStore,
    remaining: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
}

impl FailingStore {
    /// Every write fails
    pub fn new() -> Self {
        Self::after(0)
    }

    /// The first `successes` writes succeed, the rest fail
    pub fn after(successes: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            remaining: Arc::new(AtomicUsize::new(successes)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `set_item` calls, failed or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The backing memory store
    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FailingStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(TetherError::storage(format!("write to `{key}` rejected")));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<bool> {
        self.inner.remove_item(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_store_tracks_writes() {
        let store = CountingStore::new();
        store.set_item("k", "1").unwrap();
        store.set_item("k", "2").unwrap();

        assert_eq!(store.writes(), 2);
        assert_eq!(store.last_write(), Some(("k".to_string(), "2".to_string())));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_failing_store_budget() {
        let store = FailingStore::after(1);
        store.set_item("k", "ok").unwrap();
        assert!(matches!(store.set_item("k", "no"), Err(TetherError::Storage { .. })));
        assert_eq!(store.attempts(), 2);
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("ok"));
    }
}
