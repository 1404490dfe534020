//! JSON declaration manifest.
//!
//! ```json
//! {
//!   "pins": [
//!     { "name": "application", "preload": true },
//!     { "name": "md5", "to": "vendor/md5.js" }
//!   ],
//!   "directories": [
//!     { "dir": "app/javascript/components", "under": "components" }
//!   ]
//! }
//! ```

use pinmap_core::declaration::LoadError;
use pinmap_core::{DeclarationLoader, ImportMap, Pin, PinAll};
use serde::Deserialize;
use std::path::Path;

/// Default manifest location, relative to the project root.
pub const DEFAULT_MANIFEST: &str = "config/importmap.json";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    pins: Vec<Pin>,
    #[serde(default)]
    directories: Vec<PinAll>,
}

/// Loads a JSON manifest and applies its pins in file order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl DeclarationLoader for ManifestLoader {
    fn load(&self, path: &Path, map: &ImportMap) -> Result<(), LoadError> {
        let source = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&source)?;

        // Validate everything before touching the map.
        if let Some(index) = manifest.pins.iter().position(|p| p.name().trim().is_empty()) {
            return Err(format!("pins[{index}]: name must not be empty").into());
        }
        if let Some(index) = manifest
            .directories
            .iter()
            .position(|d| d.dir().trim().is_empty())
        {
            return Err(format!("directories[{index}]: dir must not be empty").into());
        }

        for pin in manifest.pins {
            map.pin(pin);
        }
        for dir in manifest.directories {
            map.pin_all_from(dir);
        }
        Ok(())
    }
}
