//! Memoization of derived import-map views.
//!
//! Each cache key owns a slot. A caller locks the slot before running the
//! producer, so concurrent callers for the same key wait for the first one and
//! receive its value instead of recomputing. Invalidation swaps in a fresh
//! slot table: callers arriving afterwards never see a value produced before
//! the invalidation.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type Memo = Arc<dyn Any + Send + Sync>;
type Slot = Arc<Mutex<Option<Memo>>>;

/// Key-addressed, single-flight memo table cleared in bulk.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    slots: Mutex<HashMap<String, Slot>>,
    generation: AtomicU64,
}

impl ResolutionCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value memoized under `key`, producing it at most once.
    ///
    /// A failed producer memoizes nothing; the next caller runs it again. A
    /// value stored under the same key with a different type is replaced.
    pub fn compute_or_fetch<T, E, F>(&self, key: &str, producer: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        let mut memo = lock(&slot);
        if let Some(value) = memo.as_ref().and_then(|m| m.downcast_ref::<T>()) {
            debug!(key, "Resolution cache hit");
            return Ok(value.clone());
        }

        debug!(key, "Resolution cache miss");
        let value = producer()?;
        *memo = Some(Arc::new(value.clone()));
        Ok(value)
    }

    /// Drop every memoized value.
    pub fn invalidate_all(&self) {
        let mut slots = lock(&self.slots);
        slots.clear();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Resolution cache invalidated");
    }

    /// Number of invalidations so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a value is currently memoized under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let slot = lock(&self.slots).get(key).cloned();
        slot.is_some_and(|slot| lock(&slot).is_some())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_compute_once_then_fetch() {
        let cache = ResolutionCache::new();
        let runs = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<String, ()> = cache.compute_or_fetch("json", || {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok("{}".to_string())
            });
            assert_eq!(value.unwrap(), "{}");
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cache.contains("json"));
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = ResolutionCache::new();
        let a: Result<u32, ()> = cache.compute_or_fetch("a", || Ok(1));
        let b: Result<u32, ()> = cache.compute_or_fetch("b", || Ok(2));
        assert_eq!((a.unwrap(), b.unwrap()), (1, 2));
    }

    #[test]
    fn test_invalidate_all_clears_every_key() {
        let cache = ResolutionCache::new();
        let _: Result<u32, ()> = cache.compute_or_fetch("a", || Ok(1));
        let _: Result<u32, ()> = cache.compute_or_fetch("b", || Ok(2));

        cache.invalidate_all();

        assert!(!cache.contains("a"));
        assert!(!cache.contains("b"));
        assert_eq!(cache.generation(), 1);
        let a: Result<u32, ()> = cache.compute_or_fetch("a", || Ok(10));
        assert_eq!(a.unwrap(), 10);
    }

    #[test]
    fn test_failed_producer_is_not_memoized() {
        let cache = ResolutionCache::new();
        let first: Result<u32, &str> = cache.compute_or_fetch("a", || Err("boom"));
        assert_eq!(first, Err("boom"));
        assert!(!cache.contains("a"));

        let second: Result<u32, &str> = cache.compute_or_fetch("a", || Ok(7));
        assert_eq!(second, Ok(7));
    }

    #[test]
    fn test_type_mismatch_recomputes() {
        let cache = ResolutionCache::new();
        let _: Result<u32, ()> = cache.compute_or_fetch("a", || Ok(1));
        let s: Result<String, ()> = cache.compute_or_fetch("a", || Ok("x".to_string()));
        assert_eq!(s.unwrap(), "x");
    }

    #[test]
    fn test_concurrent_callers_share_one_run() {
        let cache = ResolutionCache::new();
        let runs = AtomicUsize::new(0);

        let results: Vec<String> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let value: Result<String, ()> = cache.compute_or_fetch("json", || {
                            let n = runs.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok(format!("run-{n}"))
                        });
                        value.unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == "run-0"));
    }

    #[test]
    fn test_invalidation_during_production_is_not_served_stale() {
        let cache = ResolutionCache::new();
        let started = Barrier::new(2);
        let release = Barrier::new(2);

        thread::scope(|s| {
            let slow = s.spawn(|| {
                let value: Result<String, ()> = cache.compute_or_fetch("json", || {
                    started.wait();
                    release.wait();
                    Ok("stale".to_string())
                });
                value.unwrap()
            });

            started.wait();
            cache.invalidate_all();

            // Arrives after the invalidation while the old producer still runs.
            let fresh: Result<String, ()> =
                cache.compute_or_fetch("json", || Ok("fresh".to_string()));
            assert_eq!(fresh.unwrap(), "fresh");

            release.wait();
            assert_eq!(slow.join().unwrap(), "stale");
        });

        let again: Result<String, ()> =
            cache.compute_or_fetch("json", || Ok("recomputed".to_string()));
        assert_eq!(again.unwrap(), "fresh");
    }
}
