//! Per-document mutual exclusion.
//!
//! One mutex per document id, created on first use and dropped once nobody
//! holds or waits on it, so the map only ever contains ids with a build in
//! flight.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    pub(crate) fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let slot = self
            .slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        let result = {
            let _guard = slot.lock();
            f()
        };

        drop(slot);
        // Only the map's own reference left: no holder, no waiter. Cloning a
        // slot requires the shard lock, which remove_if holds.
        self.slots
            .remove_if(key, |_, slot| Arc::strong_count(slot) == 1);
        result
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn slots_are_pruned_after_use() {
        let locks = KeyedLocks::new();
        let value = locks.with_lock("INV-1", || 7);
        assert_eq!(value, 7);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    locks.with_lock("INV-1", || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn different_keys_do_not_block_each_other() {
        let locks = KeyedLocks::new();
        let nested = locks.with_lock("INV-1", || locks.with_lock("INV-2", || "ok"));
        assert_eq!(nested, "ok");
        assert_eq!(locks.len(), 0);
    }
}
