#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

//! Import-map resolution engine.
//!
//! Holds JavaScript module pins (single files and whole directories), expands
//! directory pins into concrete entries, resolves every entry to a servable URL
//! through an [`AssetResolver`], and memoizes the resulting import map until a
//! pin changes or a watched source file changes.

pub mod cache;
pub mod config;
pub mod declaration;
pub mod entry;
pub mod error;
pub mod expand;
pub mod map;
pub mod resolver;
pub mod version;
pub mod watch;

pub use cache::ResolutionCache;
pub use config::{MapConfig, CANONICAL_EXTENSION};
pub use declaration::DeclarationLoader;
pub use entry::{Pin, PinAll, PinnedDirectory, PinnedFile};
pub use error::Error;
pub use expand::DirectoryExpander;
pub use map::{ImportMap, JSON_CACHE_KEY, PRELOAD_CACHE_KEY};
pub use resolver::{codes as resolve_codes, AssetResolver, ResolveError};
pub use version::VERSION;
pub use watch::{
    CacheSweeper, ChangeCallback, FileWatcher, NotifyWatcherFactory, PollingWatcherFactory,
    WatchRoots, WatcherFactory,
};
