//! `pinmap json`, `pinmap preload` and `pinmap digest`.

use super::{load_project, ProjectOptions};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct PreloadResult {
    ok: bool,
    paths: Vec<String>,
}

#[derive(Serialize)]
struct DigestResult {
    ok: bool,
    digest: String,
}

/// Print the import map JSON.
pub fn json(options: &ProjectOptions) -> Result<()> {
    let (map, resolver) = load_project(options, None)?;
    println!("{}", map.to_json(&resolver).into_diagnostic()?);
    Ok(())
}

/// Print the resolved URLs of preloaded modules, one per line.
pub fn preload(options: &ProjectOptions, json: bool) -> Result<()> {
    let (map, resolver) = load_project(options, None)?;
    let paths = map.preloaded_module_paths(&resolver).into_diagnostic()?;

    if json {
        let result = PreloadResult { ok: true, paths };
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        for path in paths {
            println!("{path}");
        }
    }
    Ok(())
}

/// Print the SHA-1 digest of the import map JSON.
pub fn digest(options: &ProjectOptions, json: bool) -> Result<()> {
    let (map, resolver) = load_project(options, None)?;
    let digest = map.digest(&resolver).into_diagnostic()?;

    if json {
        let result = DigestResult { ok: true, digest };
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        println!("{digest}");
    }
    Ok(())
}
