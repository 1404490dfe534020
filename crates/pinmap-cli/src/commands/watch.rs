//! `pinmap watch`: print the import map digest whenever sources change.

use super::{load_project, ProjectOptions};
use miette::{IntoDiagnostic, Result};
use pinmap_core::{ImportMap, NotifyWatcherFactory, PollingWatcherFactory, WatcherFactory};
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Serialize)]
struct WatchEventResult {
    ok: bool,
    digest: String,
    unix_ms: u64,
}

pub fn run(options: &ProjectOptions, interval_ms: u64, poll: bool, json: bool) -> Result<()> {
    let factory: Arc<dyn WatcherFactory> = if poll {
        Arc::new(PollingWatcherFactory)
    } else {
        Arc::new(NotifyWatcherFactory::new())
    };
    let (map, resolver) = load_project(options, Some(factory))?;
    map.cache_sweeper(None).into_diagnostic()?;
    info!(roots = ?map.config().cache_sweepers, "Watching for changes");

    emit(&map, &resolver, json)?;
    loop {
        thread::sleep(Duration::from_millis(interval_ms));
        if map.execute_if_updated().into_diagnostic()? {
            emit(&map, &resolver, json)?;
        }
    }
}

fn emit(map: &ImportMap, resolver: &crate::assets::DigestResolver, json: bool) -> Result<()> {
    let digest = map.digest(resolver).into_diagnostic()?;
    if json {
        #[allow(clippy::cast_possible_truncation)]
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let result = WatchEventResult {
            ok: true,
            digest,
            unix_ms,
        };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else {
        println!("{digest}");
    }
    Ok(())
}
