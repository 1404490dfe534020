//! Stamp-polling watcher.
//!
//! Records mtime and size of every matching file at creation and compares a
//! fresh snapshot on each check. Suited to request-time checks in development,
//! where no background thread is wanted.

use super::{ChangeCallback, FileWatcher, WatchRoots, WatcherFactory};
use crate::error::Error;
use pinmap_util::fs::files_with_extensions;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Creates [`PollingWatcher`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollingWatcherFactory;

impl WatcherFactory for PollingWatcherFactory {
    fn watch(
        &self,
        roots: WatchRoots,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn FileWatcher>, Error> {
        Ok(Box::new(PollingWatcher::new(roots, on_change)))
    }
}

/// File stamp for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    mtime_ns: Option<u128>,
    size: u64,
}

impl FileStamp {
    fn from_path(path: &Path) -> Option<Self> {
        let meta = path.metadata().ok()?;
        let mtime_ns = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_nanos());
        Some(Self {
            mtime_ns,
            size: meta.len(),
        })
    }
}

type Snapshot = BTreeMap<PathBuf, FileStamp>;

/// Compares file stamps under the watched roots on demand.
pub struct PollingWatcher {
    roots: WatchRoots,
    snapshot: Mutex<Snapshot>,
    on_change: ChangeCallback,
}

impl PollingWatcher {
    #[must_use]
    pub fn new(roots: WatchRoots, on_change: ChangeCallback) -> Self {
        let snapshot = take_snapshot(&roots);
        debug!(files = snapshot.len(), "Polling watcher snapshot taken");
        Self {
            roots,
            snapshot: Mutex::new(snapshot),
            on_change,
        }
    }
}

impl FileWatcher for PollingWatcher {
    fn execute_if_updated(&self) -> bool {
        let current = take_snapshot(&self.roots);
        {
            let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
            if *snapshot == current {
                return false;
            }
            *snapshot = current;
        }
        (self.on_change)();
        true
    }
}

fn take_snapshot(roots: &WatchRoots) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for (root, extensions) in roots {
        if !root.is_dir() {
            continue;
        }
        match files_with_extensions(root, extensions) {
            Ok(files) => {
                for file in files {
                    if let Some(stamp) = FileStamp::from_path(&file) {
                        snapshot.insert(file, stamp);
                    }
                }
            }
            Err(e) => {
                debug!(root = %root.display(), error = %e, "Skipping unreadable watch root");
            }
        }
    }
    snapshot
}
