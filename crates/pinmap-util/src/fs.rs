use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Check whether `path` has one of the given extensions (without leading dot).
#[must_use]
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.as_ref() == ext))
}

/// Recursively collect files under `root` whose extension is in `extensions`.
///
/// Entries are visited in file-name order so the result is deterministic
/// across platforms. Directories are never returned, even when their name
/// carries a matching extension.
///
/// # Errors
/// Returns the first walk error (e.g. permission denied on a subdirectory).
pub fn files_with_extensions<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Render `path` relative to `base` with `/` separators.
///
/// Returns `None` if `path` is not under `base` or a component is not
/// valid UTF-8.
#[must_use]
pub fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<&str>>>()?;
    Some(parts.join("/"))
}
