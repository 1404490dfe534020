//! Directory pin expansion.
//!
//! A directory pin becomes one [`PinnedFile`] per accepted source file beneath
//! its root. Names drop the source extension and collapse `index` files onto
//! their directory; paths always carry the canonical extension, so
//! `components/Clock.jsx` is served as `components/Clock.js`.
//!
//! Expansion only ever inserts names that are absent from the target set. The
//! caller copies explicit pins in first, which makes explicit pins win over
//! directory-derived entries and earlier directories win over later ones.

use crate::config::MapConfig;
use crate::entry::{canonical_filename, strip_extension, PinnedDirectory, PinnedFile};
use crate::error::Error;
use indexmap::IndexMap;
use pinmap_util::fs::{files_with_extensions, relative_slash_path};
use tracing::debug;

/// Expands directory pins using one snapshot of the accepted extensions.
#[derive(Debug, Clone)]
pub struct DirectoryExpander<'a> {
    config: &'a MapConfig,
    extensions: Vec<String>,
    extra_extensions: Vec<String>,
}

impl<'a> DirectoryExpander<'a> {
    #[must_use]
    pub fn new(config: &'a MapConfig) -> Self {
        Self {
            config,
            extensions: config.extensions(),
            extra_extensions: config.extra_extensions(),
        }
    }

    /// Expand every directory, in order, into `entries` without overwriting.
    pub fn expand_all<'d>(
        &self,
        directories: impl IntoIterator<Item = &'d PinnedDirectory>,
        entries: &mut IndexMap<String, PinnedFile>,
    ) -> Result<(), Error> {
        for mapping in directories {
            self.expand_into(mapping, entries)?;
        }
        Ok(())
    }

    /// Expand one directory pin into `entries`.
    ///
    /// Returns the number of entries added. A missing root adds nothing.
    pub fn expand_into(
        &self,
        mapping: &PinnedDirectory,
        entries: &mut IndexMap<String, PinnedFile>,
    ) -> Result<usize, Error> {
        let root = self.config.absolute(&mapping.dir);
        if !root.is_dir() {
            debug!(dir = %root.display(), "Pinned directory does not exist, skipping");
            return Ok(0);
        }

        let files = files_with_extensions(&root, &self.extensions).map_err(|source| {
            Error::Walk {
                root: root.clone(),
                source,
            }
        })?;

        let mut added = 0;
        for file in files {
            let Some(relative) = relative_slash_path(&file, &root) else {
                continue;
            };
            let name = self.module_name(&relative, mapping.under.as_deref());
            if entries.contains_key(&name) {
                continue;
            }
            let path = self.module_path(&relative, mapping);
            entries.insert(
                name.clone(),
                PinnedFile {
                    name,
                    path,
                    preload: mapping.preload,
                },
            );
            added += 1;
        }

        debug!(dir = %root.display(), added, "Expanded pinned directory");
        Ok(added)
    }

    /// Module name for a file at `relative` (slash-separated) under `under`.
    #[must_use]
    pub fn module_name(&self, relative: &str, under: Option<&str>) -> String {
        let stem = strip_extension(relative, &self.extensions);
        join_segments(under, self.strip_index(stem))
    }

    /// Logical asset path for a file at `relative` under `mapping`.
    #[must_use]
    pub fn module_path(&self, relative: &str, mapping: &PinnedDirectory) -> String {
        let prefix = mapping.path.as_deref().or(mapping.under.as_deref());
        let filename = canonical_filename(strip_extension(relative, &self.extensions));
        join_segments(prefix, &filename)
    }

    /// Drop a trailing `index` segment, optionally suffixed by an extra extension.
    fn strip_index<'s>(&self, stem: &'s str) -> &'s str {
        let base = self
            .extra_extensions
            .iter()
            .find_map(|ext| {
                stem.strip_suffix(ext.as_str())
                    .and_then(|rest| rest.strip_suffix('.'))
                    .filter(|rest| is_index(rest))
            })
            .unwrap_or(stem);

        if base == "index" {
            ""
        } else if let Some(parent) = base.strip_suffix("/index") {
            parent
        } else {
            stem
        }
    }
}

fn is_index(stem: &str) -> bool {
    stem == "index" || stem.ends_with("/index")
}

fn join_segments(prefix: Option<&str>, rest: &str) -> String {
    let prefix = prefix.map(|p| p.trim_end_matches('/')).unwrap_or_default();
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{rest}"),
    }
}
