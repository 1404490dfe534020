//! Change detection for cache invalidation.
//!
//! The map does not look for changes itself. A [`WatcherFactory`] supplies a
//! [`FileWatcher`] for a set of roots; the [`CacheSweeper`] wires that watcher
//! to the resolution cache so any change clears every memoized view.

mod evented;
mod poll;

pub use evented::NotifyWatcherFactory;
pub use poll::{PollingWatcher, PollingWatcherFactory};

use crate::cache::ResolutionCache;
use crate::error::Error;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Invoked when a watched file changes.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Watched root directory -> accepted extensions beneath it.
pub type WatchRoots = BTreeMap<PathBuf, Vec<String>>;

/// A subscription to file changes under a set of roots.
pub trait FileWatcher: Send {
    /// Run the change callback if a watched file changed since the last
    /// check. Returns whether it ran.
    fn execute_if_updated(&self) -> bool;
}

/// Creates [`FileWatcher`]s.
pub trait WatcherFactory: Send + Sync {
    fn watch(
        &self,
        roots: WatchRoots,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn FileWatcher>, Error>;
}

/// Clears a [`ResolutionCache`] whenever a watched source file changes.
pub struct CacheSweeper {
    roots: Vec<PathBuf>,
    watcher: Box<dyn FileWatcher>,
}

impl std::fmt::Debug for CacheSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSweeper")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl CacheSweeper {
    /// Subscribe to `roots` (filtered by `extensions`) and clear `cache` on change.
    pub fn install(
        factory: &dyn WatcherFactory,
        roots: &[PathBuf],
        extensions: &[String],
        cache: Arc<ResolutionCache>,
    ) -> Result<Self, Error> {
        let watch_roots: WatchRoots = roots
            .iter()
            .map(|root| (root.clone(), extensions.to_vec()))
            .collect();

        let on_change: ChangeCallback = Arc::new(move || {
            debug!("Watched files changed, clearing import map cache");
            cache.invalidate_all();
        });

        let watcher = factory.watch(watch_roots, on_change)?;
        info!(roots = roots.len(), "Cache sweeper installed");

        Ok(Self {
            roots: roots.to_vec(),
            watcher,
        })
    }

    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Clear the cache if a watched file changed. Returns whether it did.
    #[must_use]
    pub fn execute_if_updated(&self) -> bool {
        self.watcher.execute_if_updated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Watcher whose "changed" state is flipped by the test.
    struct ManualWatcher {
        changed: Arc<AtomicBool>,
        on_change: ChangeCallback,
    }

    impl FileWatcher for ManualWatcher {
        fn execute_if_updated(&self) -> bool {
            if self.changed.swap(false, Ordering::SeqCst) {
                (self.on_change)();
                true
            } else {
                false
            }
        }
    }

    struct ManualFactory {
        changed: Arc<AtomicBool>,
    }

    impl WatcherFactory for ManualFactory {
        fn watch(
            &self,
            roots: WatchRoots,
            on_change: ChangeCallback,
        ) -> Result<Box<dyn FileWatcher>, Error> {
            assert!(roots.values().all(|exts| exts.contains(&"js".to_string())));
            Ok(Box::new(ManualWatcher {
                changed: Arc::clone(&self.changed),
                on_change,
            }))
        }
    }

    #[test]
    fn test_sweeper_clears_cache_on_change() {
        let cache = Arc::new(ResolutionCache::new());
        let changed = Arc::new(AtomicBool::new(false));
        let factory = ManualFactory {
            changed: Arc::clone(&changed),
        };

        let sweeper = CacheSweeper::install(
            &factory,
            &[PathBuf::from("/srv/app/javascript")],
            &["js".to_string()],
            Arc::clone(&cache),
        )
        .unwrap();
        assert_eq!(sweeper.roots(), &[PathBuf::from("/srv/app/javascript")]);

        let _: Result<u32, ()> = cache.compute_or_fetch("json", || Ok(1));
        assert!(!sweeper.execute_if_updated());
        assert!(cache.contains("json"));

        changed.store(true, Ordering::SeqCst);
        assert!(sweeper.execute_if_updated());
        assert!(!cache.contains("json"));
    }
}
