//! Pin value types.
//!
//! [`Pin`] and [`PinAll`] are the declaration-side builders; the registry
//! stores the normalized [`PinnedFile`] and [`PinnedDirectory`] values.

use crate::config::CANONICAL_EXTENSION;
use serde::{Deserialize, Serialize};

/// A single module pinned to a logical asset path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedFile {
    /// Module specifier used in `import` statements.
    pub name: String,
    /// Logical asset path handed to the resolver.
    pub path: String,
    /// Whether the module is listed for eager fetching.
    pub preload: bool,
}

/// A directory whose files are pinned under a common prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedDirectory {
    /// Filesystem root, relative to the map root or absolute.
    pub dir: String,
    /// Module-name prefix for files found beneath `dir`.
    pub under: Option<String>,
    /// Asset-path prefix; falls back to `under`.
    pub path: Option<String>,
    /// Preload flag applied to every expanded file.
    pub preload: bool,
}

/// Declaration of a single-file pin.
///
/// ```
/// use pinmap_core::Pin;
///
/// let pin = Pin::new("react").to("vendor/react.js").preload(true);
/// # let _ = pin;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pin {
    name: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    preload: bool,
}

impl Pin {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            to: None,
            preload: false,
        }
    }

    /// Explicit logical path instead of the one derived from the name.
    #[must_use]
    pub fn to(mut self, path: impl Into<String>) -> Self {
        self.to = Some(path.into());
        self
    }

    #[must_use]
    pub fn preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalize into a registry entry, deriving the path when none was given.
    pub(crate) fn into_pinned(self, extensions: &[String]) -> PinnedFile {
        let path = self
            .to
            .unwrap_or_else(|| canonical_filename(strip_extension(&self.name, extensions)));
        PinnedFile {
            name: self.name,
            path,
            preload: self.preload,
        }
    }
}

impl From<&str> for Pin {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Pin {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Declaration of a directory pin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PinAll {
    dir: String,
    #[serde(default)]
    under: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    preload: bool,
}

impl PinAll {
    #[must_use]
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            under: None,
            to: None,
            preload: false,
        }
    }

    #[must_use]
    pub fn under(mut self, prefix: impl Into<String>) -> Self {
        self.under = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn to(mut self, path: impl Into<String>) -> Self {
        self.to = Some(path.into());
        self
    }

    #[must_use]
    pub fn preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub(crate) fn into_pinned(self) -> PinnedDirectory {
        PinnedDirectory {
            dir: self.dir,
            under: self.under,
            path: self.to,
            preload: self.preload,
        }
    }
}

impl From<&str> for PinAll {
    fn from(dir: &str) -> Self {
        Self::new(dir)
    }
}

impl From<String> for PinAll {
    fn from(dir: String) -> Self {
        Self::new(dir)
    }
}

/// Strip one trailing `.{ext}` if `ext` is accepted.
pub(crate) fn strip_extension<'a>(name: &'a str, extensions: &[String]) -> &'a str {
    extensions
        .iter()
        .find_map(|ext| {
            name.strip_suffix(ext.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
                .filter(|rest| !rest.is_empty() && !rest.ends_with('/'))
        })
        .unwrap_or(name)
}

/// Append the canonical module extension.
pub(crate) fn canonical_filename(stem: &str) -> String {
    format!("{stem}.{CANONICAL_EXTENSION}")
}
