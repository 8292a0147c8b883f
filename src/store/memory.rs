use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use anyhow::{bail, Result};

use super::KeyValueStore;

/// In-process [`KeyValueStore`] with switchable failures.
///
/// Used as the store test double: reads and writes can be made to fail, and
/// writes can be slowed down to widen the window for interleaving bugs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    write_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_delay(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value without going through the failure switches.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock_entries().get(key).cloned()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("simulated read failure for {key}");
        }
        Ok(self.lock_entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("simulated write failure for {key}");
        }
        self.lock_entries().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("simulated remove failure for {key}");
        }
        self.lock_entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failure_switches_apply_per_direction() {
        let store = MemoryStore::new();
        store.set("k", "v".into()).await.unwrap();

        store.fail_reads(true);
        assert!(store.get("k").await.is_err());
        store.set("k", "w".into()).await.unwrap();
        store.fail_reads(false);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("w"));

        store.fail_writes(true);
        assert!(store.set("k", "x".into()).await.is_err());
        assert!(store.remove("k").await.is_err());
        assert_eq!(store.peek("k").as_deref(), Some("w"));
        assert_eq!(store.write_count(), 2);
    }
}
