//! Declaration loading.
//!
//! A declaration file is whatever format a host chooses; a
//! [`DeclarationLoader`] reads it and issues pins against the map. Any failure
//! inside the loader is reported as [`Error::InvalidDeclaration`] naming the
//! file.

use crate::error::Error;
use crate::map::ImportMap;
use std::path::Path;

/// Boxed loader failure.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Applies the pins declared in a file to an [`ImportMap`].
pub trait DeclarationLoader {
    fn load(&self, path: &Path, map: &ImportMap) -> Result<(), LoadError>;
}

impl ImportMap {
    /// Load pins from `path` (resolved against the map root) with `loader`.
    pub fn draw<L: DeclarationLoader + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        loader: &L,
    ) -> Result<&Self, Error> {
        let path = self.config().absolute(path);
        loader
            .load(&path, self)
            .map_err(|e| Error::InvalidDeclaration {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(self)
    }

    /// Apply pins programmatically.
    pub fn draw_with<F>(&self, declare: F) -> &Self
    where
        F: FnOnce(&ImportMap),
    {
        declare(self);
        self
    }
}
