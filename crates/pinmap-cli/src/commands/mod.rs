pub mod map;
pub mod pins;
pub mod version;
pub mod watch;

use crate::assets::DigestResolver;
use crate::manifest::ManifestLoader;
use miette::{IntoDiagnostic, Result};
use pinmap_core::{ImportMap, MapConfig, WatcherFactory};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Project-level options shared by every map command.
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    /// Project root; relative paths below resolve against it.
    pub root: PathBuf,
    /// Declaration manifest.
    pub manifest: PathBuf,
    /// Extra source extensions accepted besides `js`.
    pub extensions: Vec<String>,
    /// Directories searched by the asset resolver.
    pub load_paths: Vec<PathBuf>,
    /// URL prefix for resolved assets.
    pub prefix: String,
}

impl ProjectOptions {
    fn config(&self) -> MapConfig {
        let config = MapConfig::new(self.root.clone()).with_cache_sweepers(self.load_paths.clone());
        self.extensions
            .iter()
            .fold(config, |config, ext| config.with_extension(ext))
    }

    fn resolver(&self, config: &MapConfig) -> DigestResolver {
        let load_paths = self.load_paths.iter().map(|p| config.absolute(p)).collect();
        DigestResolver::new(load_paths, &self.prefix, config.extra_extensions())
    }
}

/// Build the map from the manifest, plus the resolver that serves it.
pub fn load_project(
    options: &ProjectOptions,
    watcher_factory: Option<Arc<dyn WatcherFactory>>,
) -> Result<(ImportMap, DigestResolver)> {
    let config = options.config();
    let resolver = options.resolver(&config);

    let mut map = ImportMap::new(config);
    if let Some(factory) = watcher_factory {
        map = map.with_watcher_factory(factory);
    }
    map.draw(&options.manifest, &ManifestLoader).into_diagnostic()?;

    debug!(
        pins = map.packages().len(),
        directories = map.directories().len(),
        "Loaded import map manifest"
    );
    Ok((map, resolver))
}
