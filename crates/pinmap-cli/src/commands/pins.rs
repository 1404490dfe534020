//! `pinmap pins`: list declared and expanded pins.

use super::{load_project, ProjectOptions};
use miette::{IntoDiagnostic, Result};
use pinmap_core::{PinnedDirectory, PinnedFile};
use serde::Serialize;

#[derive(Serialize)]
struct PinsResult {
    ok: bool,
    packages: Vec<PinnedFile>,
    directories: Vec<PinnedDirectory>,
    expanded: Vec<PinnedFile>,
}

pub fn run(options: &ProjectOptions, json: bool) -> Result<()> {
    let (map, _) = load_project(options, None)?;
    let result = PinsResult {
        ok: true,
        packages: map.packages().into_values().collect(),
        directories: map.directories().into_values().collect(),
        expanded: map.expanded_entries().into_diagnostic()?.into_values().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
        return Ok(());
    }

    let width = result
        .expanded
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(0);
    for entry in &result.expanded {
        let preload = if entry.preload { "  (preload)" } else { "" };
        println!("{:<width$}  {}{preload}", entry.name, entry.path);
    }
    Ok(())
}
