use crate::resolver::codes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension every served module carries, regardless of its source extension.
pub const CANONICAL_EXTENSION: &str = "js";

/// Directories swept for changes when no explicit watch list is given.
const DEFAULT_CACHE_SWEEPERS: &[&str] = &["app/javascript", "vendor/javascript"];

/// Host-supplied configuration for an [`ImportMap`](crate::ImportMap).
///
/// Immutable once the map is constructed, so every resolution pass sees one
/// consistent set of extensions and recoverable error codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Root that relative directory pins and sweeper paths resolve against.
    pub root: PathBuf,

    /// Source extensions eligible for directory expansion (without the dot).
    pub accepted_extensions: Vec<String>,

    /// Resolver error codes that omit an entry instead of failing the map.
    pub recoverable_errors: Vec<String>,

    /// Directories watched by the default cache sweeper.
    pub cache_sweepers: Vec<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            accepted_extensions: vec![CANONICAL_EXTENSION.to_string()],
            recoverable_errors: vec![codes::ASSET_NOT_FOUND.to_string()],
            cache_sweepers: DEFAULT_CACHE_SWEEPERS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl MapConfig {
    /// Create a new config rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Accept an additional source extension (e.g. `jsx`).
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        let extension = extension.trim_start_matches('.');
        if !extension.is_empty() && !self.accepted_extensions.iter().any(|e| e == extension) {
            self.accepted_extensions.push(extension.to_string());
        }
        self
    }

    /// Treat resolver failures with `code` as recoverable misses.
    #[must_use]
    pub fn with_recoverable_error(mut self, code: &str) -> Self {
        if !self.is_recoverable(code) {
            self.recoverable_errors.push(code.to_string());
        }
        self
    }

    /// Replace the default sweeper directories.
    #[must_use]
    pub fn with_cache_sweepers(mut self, dirs: Vec<PathBuf>) -> Self {
        self.cache_sweepers = dirs;
        self
    }

    /// Accepted extensions, canonical first, deduplicated.
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        let mut out = vec![CANONICAL_EXTENSION.to_string()];
        for ext in &self.accepted_extensions {
            let ext = ext.trim_start_matches('.');
            if !ext.is_empty() && !out.iter().any(|e| e == ext) {
                out.push(ext.to_string());
            }
        }
        out
    }

    /// Accepted extensions other than the canonical one.
    #[must_use]
    pub fn extra_extensions(&self) -> Vec<String> {
        self.extensions().into_iter().skip(1).collect()
    }

    /// Whether a resolver failure code is in the recoverable set.
    #[must_use]
    pub fn is_recoverable(&self, code: &str) -> bool {
        self.recoverable_errors.iter().any(|c| c == code)
    }

    /// Resolve `path` against the root unless it is already absolute.
    #[must_use]
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
