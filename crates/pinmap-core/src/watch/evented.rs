//! Push-based watcher backed by `notify`.

use super::{ChangeCallback, FileWatcher, WatchRoots, WatcherFactory};
use crate::error::Error;
use notify::{
    event::{CreateKind, ModifyKind, RemoveKind, RenameMode},
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _,
};
use pinmap_util::fs::has_extension;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Creates OS-notification watchers.
///
/// The callback runs on the notification thread as soon as a matching event
/// arrives; [`FileWatcher::execute_if_updated`] reports (and replays) any
/// change seen since the previous check.
#[derive(Debug, Clone, Copy)]
pub struct NotifyWatcherFactory {
    poll_interval: Duration,
}

impl Default for NotifyWatcherFactory {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl NotifyWatcherFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval used when the platform falls back to polling.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl WatcherFactory for NotifyWatcherFactory {
    fn watch(
        &self,
        roots: WatchRoots,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn FileWatcher>, Error> {
        // Missing roots are skipped; notify cannot watch what does not exist.
        let roots: Vec<(PathBuf, Vec<String>)> = roots
            .into_iter()
            .filter_map(|(root, extensions)| {
                if root.is_dir() {
                    let root = dunce::canonicalize(&root).unwrap_or(root);
                    Some((root, extensions))
                } else {
                    debug!(root = %root.display(), "Watch root does not exist, skipping");
                    None
                }
            })
            .collect();

        let updated = Arc::new(AtomicBool::new(false));
        let handler_roots = roots.clone();
        let handler_updated = Arc::clone(&updated);
        let handler_callback = Arc::clone(&on_change);

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if should_process_event(&event)
                        && event.paths.iter().any(|p| matches_root(&handler_roots, p))
                    {
                        handler_updated.store(true, Ordering::SeqCst);
                        handler_callback();
                    }
                }
                Err(e) => {
                    error!(error = %e, "Watch error");
                }
            },
            Config::default().with_poll_interval(self.poll_interval),
        )
        .map_err(|e| Error::Watch(e.to_string()))?;

        for (root, _) in &roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| Error::Watch(e.to_string()))?;
            info!(root = %root.display(), "Watching directory");
        }

        Ok(Box::new(NotifyWatcher {
            _watcher: watcher,
            updated,
            on_change,
        }))
    }
}

struct NotifyWatcher {
    // Dropping the handle stops the subscription.
    _watcher: RecommendedWatcher,
    updated: Arc<AtomicBool>,
    on_change: ChangeCallback,
}

impl FileWatcher for NotifyWatcher {
    fn execute_if_updated(&self) -> bool {
        if self.updated.swap(false, Ordering::SeqCst) {
            (self.on_change)();
            true
        } else {
            false
        }
    }
}

fn matches_root(roots: &[(PathBuf, Vec<String>)], path: &Path) -> bool {
    roots
        .iter()
        .any(|(root, extensions)| path.starts_with(root) && has_extension(path, extensions))
}

/// Check if we should process this event.
fn should_process_event(event: &Event) -> bool {
    match &event.kind {
        EventKind::Create(CreateKind::File | CreateKind::Any)
        | EventKind::Modify(
            ModifyKind::Data(_)
            | ModifyKind::Any
            | ModifyKind::Name(RenameMode::To | RenameMode::From | RenameMode::Both | RenameMode::Any),
        )
        | EventKind::Remove(RemoveKind::File | RemoveKind::Any) => true,
        // Ignore directories, metadata changes, and other events
        _ => false,
    }
}
