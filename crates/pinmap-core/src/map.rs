//! The import map: pin registry plus memoized resolution.

use crate::cache::ResolutionCache;
use crate::config::MapConfig;
use crate::entry::{Pin, PinAll, PinnedDirectory, PinnedFile};
use crate::error::Error;
use crate::expand::DirectoryExpander;
use crate::resolver::AssetResolver;
use crate::watch::{CacheSweeper, PollingWatcherFactory, WatcherFactory};
use indexmap::IndexMap;
use pinmap_util::hash::sha1_hex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Default cache key for [`ImportMap::to_json`].
pub const JSON_CACHE_KEY: &str = "json";

/// Default cache key for [`ImportMap::preloaded_module_paths`].
pub const PRELOAD_CACHE_KEY: &str = "preloaded_module_paths";

#[derive(Debug, Clone, Default)]
struct Registry {
    packages: IndexMap<String, PinnedFile>,
    directories: IndexMap<String, PinnedDirectory>,
}

#[derive(Serialize)]
struct ImportsDocument<'a> {
    imports: &'a IndexMap<String, String>,
}

/// Registry of pins with a memoized, invalidatable import map.
///
/// All operations take `&self`; share the map across threads with `Arc`.
pub struct ImportMap {
    config: Arc<MapConfig>,
    registry: RwLock<Registry>,
    cache: Arc<ResolutionCache>,
    watcher_factory: Arc<dyn WatcherFactory>,
    sweeper: Mutex<Option<CacheSweeper>>,
}

impl std::fmt::Debug for ImportMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportMap")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Default for ImportMap {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl ImportMap {
    /// Create an empty map. Change detection defaults to stamp polling.
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        Self {
            config: Arc::new(config),
            registry: RwLock::new(Registry::default()),
            cache: Arc::new(ResolutionCache::new()),
            watcher_factory: Arc::new(PollingWatcherFactory),
            sweeper: Mutex::new(None),
        }
    }

    /// Use a different change-detection primitive for cache sweepers.
    #[must_use]
    pub fn with_watcher_factory(mut self, factory: Arc<dyn WatcherFactory>) -> Self {
        self.watcher_factory = factory;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Shared handle to the resolution cache.
    #[must_use]
    pub fn cache(&self) -> Arc<ResolutionCache> {
        Arc::clone(&self.cache)
    }

    /// Pin a single module, replacing any earlier pin with the same name.
    pub fn pin(&self, pin: impl Into<Pin>) -> &Self {
        let pinned = pin.into().into_pinned(&self.config.extensions());
        let mut registry = write(&self.registry);
        debug!(name = %pinned.name, path = %pinned.path, "Pinned module");
        registry.packages.insert(pinned.name.clone(), pinned);
        self.cache.invalidate_all();
        self
    }

    /// Pin every accepted file under a directory, replacing any earlier pin
    /// of the same directory.
    pub fn pin_all_from(&self, pin: impl Into<PinAll>) -> &Self {
        let pinned = pin.into().into_pinned();
        let mut registry = write(&self.registry);
        debug!(dir = %pinned.dir, under = ?pinned.under, "Pinned directory");
        registry.directories.insert(pinned.dir.clone(), pinned);
        self.cache.invalidate_all();
        self
    }

    /// Snapshot of the explicit single-file pins, in declaration order.
    #[must_use]
    pub fn packages(&self) -> IndexMap<String, PinnedFile> {
        read(&self.registry).packages.clone()
    }

    /// Snapshot of the directory pins, in declaration order.
    #[must_use]
    pub fn directories(&self) -> IndexMap<String, PinnedDirectory> {
        read(&self.registry).directories.clone()
    }

    /// Explicit pins followed by directory-derived entries that do not
    /// collide with an earlier name.
    pub fn expanded_entries(&self) -> Result<IndexMap<String, PinnedFile>, Error> {
        let registry = read(&self.registry).clone();
        let mut entries = registry.packages;
        DirectoryExpander::new(&self.config).expand_all(registry.directories.values(), &mut entries)?;
        Ok(entries)
    }

    /// Pretty-printed `{"imports": {...}}` document, memoized under `"json"`.
    pub fn to_json<R: AssetResolver + ?Sized>(&self, resolver: &R) -> Result<String, Error> {
        self.to_json_cached_as(resolver, JSON_CACHE_KEY)
    }

    /// [`to_json`](Self::to_json) memoized under a caller-chosen key.
    pub fn to_json_cached_as<R: AssetResolver + ?Sized>(
        &self,
        resolver: &R,
        cache_key: &str,
    ) -> Result<String, Error> {
        self.cache.compute_or_fetch(cache_key, || {
            let entries = self.expanded_entries()?;
            let imports = self.resolve_asset_paths(entries.values(), resolver)?;
            serde_json::to_string_pretty(&ImportsDocument { imports: &imports })
                .map_err(|e| Error::other(format!("Failed to serialize import map: {e}")))
        })
    }

    /// Resolved URLs of preloaded entries, memoized under
    /// `"preloaded_module_paths"`.
    pub fn preloaded_module_paths<R: AssetResolver + ?Sized>(
        &self,
        resolver: &R,
    ) -> Result<Vec<String>, Error> {
        self.preloaded_module_paths_cached_as(resolver, PRELOAD_CACHE_KEY)
    }

    /// [`preloaded_module_paths`](Self::preloaded_module_paths) memoized
    /// under a caller-chosen key.
    pub fn preloaded_module_paths_cached_as<R: AssetResolver + ?Sized>(
        &self,
        resolver: &R,
        cache_key: &str,
    ) -> Result<Vec<String>, Error> {
        self.cache.compute_or_fetch(cache_key, || {
            let entries = self.expanded_entries()?;
            let preloaded = entries.values().filter(|entry| entry.preload);
            let resolved = self.resolve_asset_paths(preloaded, resolver)?;
            Ok(resolved.into_values().collect())
        })
    }

    /// SHA-1 hex digest of the import map JSON, for use as an ETag.
    pub fn digest<R: AssetResolver + ?Sized>(&self, resolver: &R) -> Result<String, Error> {
        Ok(sha1_hex(self.to_json(resolver)?.as_bytes()))
    }

    /// Drop every memoized view.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Install the cache sweeper.
    ///
    /// With `None`, the configured sweeper directories are used and an
    /// existing sweeper is kept. An explicit list always replaces it.
    /// Installing a sweeper clears the cache, since the new watcher cannot
    /// see changes made before it existed.
    pub fn cache_sweeper(&self, watches: Option<Vec<PathBuf>>) -> Result<(), Error> {
        let mut sweeper = lock(&self.sweeper);
        if sweeper.is_some() && watches.is_none() {
            return Ok(());
        }
        *sweeper = Some(self.install_sweeper(watches)?);
        Ok(())
    }

    /// Check the sweeper's watched roots and clear the cache if anything
    /// changed.
    ///
    /// The first call installs the default sweeper and reports an update,
    /// because anything memoized earlier was never watched.
    pub fn execute_if_updated(&self) -> Result<bool, Error> {
        let mut sweeper = lock(&self.sweeper);
        if let Some(installed) = sweeper.as_ref() {
            return Ok(installed.execute_if_updated());
        }
        *sweeper = Some(self.install_sweeper(None)?);
        Ok(true)
    }

    fn install_sweeper(&self, watches: Option<Vec<PathBuf>>) -> Result<CacheSweeper, Error> {
        let roots: Vec<PathBuf> = watches
            .unwrap_or_else(|| self.config.cache_sweepers.clone())
            .into_iter()
            .map(|dir| self.config.absolute(dir))
            .collect();

        let sweeper = CacheSweeper::install(
            self.watcher_factory.as_ref(),
            &roots,
            &self.config.extensions(),
            self.cache(),
        )?;
        self.cache.invalidate_all();
        Ok(sweeper)
    }

    fn resolve_asset_paths<'e, R: AssetResolver + ?Sized>(
        &self,
        entries: impl Iterator<Item = &'e PinnedFile>,
        resolver: &R,
    ) -> Result<IndexMap<String, String>, Error> {
        let mut resolved = IndexMap::new();
        for entry in entries {
            match resolver.resolve(&entry.path) {
                Ok(url) => {
                    resolved.insert(entry.name.clone(), url);
                }
                Err(e) if self.config.is_recoverable(e.code()) => {
                    warn!(path = %entry.path, code = e.code(), "Import map skipped missing path");
                }
                Err(source) => {
                    return Err(Error::Resolve {
                        path: entry.path.clone(),
                        source,
                    });
                }
            }
        }
        Ok(resolved)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
