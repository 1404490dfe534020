//! Content-digest asset resolver.
//!
//! Looks a logical path up in the load paths and returns a URL carrying a
//! short BLAKE3 digest of the file, so any edit yields a new URL. A logical
//! `components/Clock.js` with no such file falls back to a source with an
//! extra extension, e.g. `components/Clock.jsx`.

use pinmap_core::{AssetResolver, ResolveError};
use pinmap_util::hash::blake3_file;
use std::path::{Component, Path, PathBuf};

/// Hex characters of the digest kept in the URL.
const DIGEST_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct DigestResolver {
    load_paths: Vec<PathBuf>,
    prefix: String,
    source_extensions: Vec<String>,
}

impl DigestResolver {
    #[must_use]
    pub fn new(load_paths: Vec<PathBuf>, prefix: &str, source_extensions: Vec<String>) -> Self {
        Self {
            load_paths,
            prefix: prefix.trim_end_matches('/').to_string(),
            source_extensions,
        }
    }

    /// First file in the load paths backing `logical_path`.
    fn find_source(&self, logical_path: &str) -> Option<PathBuf> {
        let relative = Path::new(logical_path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        let stem = logical_path
            .rsplit_once('.')
            .filter(|(_, ext)| !ext.contains('/'))
            .map(|(stem, _)| stem);
        self.load_paths.iter().find_map(|load_path| {
            let direct = load_path.join(relative);
            if direct.is_file() {
                return Some(direct);
            }
            let stem = stem?;
            self.source_extensions
                .iter()
                .map(|ext| load_path.join(format!("{stem}.{ext}")))
                .find(|candidate| candidate.is_file())
        })
    }
}

impl AssetResolver for DigestResolver {
    fn resolve(&self, logical_path: &str) -> Result<String, ResolveError> {
        let source = self
            .find_source(logical_path)
            .ok_or_else(|| ResolveError::not_found(logical_path))?;
        let digest = blake3_file(&source)
            .map_err(|e| ResolveError::failed(format!("{}: {e}", source.display())))?;

        let (stem, extension) = match logical_path.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') => (stem, Some(ext)),
            _ => (logical_path, None),
        };
        let short = &digest[..DIGEST_LEN];
        Ok(match extension {
            Some(ext) => format!("{}/{stem}-{short}.{ext}", self.prefix),
            None => format!("{}/{stem}-{short}", self.prefix),
        })
    }
}
