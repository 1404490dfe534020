//! Integration tests for the `pinmap` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

const MANIFEST: &str = r#"{
    "pins": [
        {"name": "application", "preload": true},
        {"name": "md5", "to": "md5.js"},
        {"name": "ghost"}
    ],
    "directories": [
        {"dir": "app/javascript/controllers", "under": "controllers", "preload": true}
    ]
}"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "config/importmap.json", MANIFEST);
    write(dir.path(), "app/javascript/application.js", "hello world");
    write(dir.path(), "app/javascript/controllers/index.js", "index");
    write(dir.path(), "app/javascript/controllers/hello_controller.js", "hello");
    write(dir.path(), "vendor/javascript/md5.js", "md5");
    dir
}

fn pinmap(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pinmap"))
        .arg("--cwd")
        .arg(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pinmap")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "pinmap failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_json_prints_import_map() {
    let dir = project();
    let out = stdout(&pinmap(dir.path(), &["json"]));

    let json: serde_json::Value = serde_json::from_str(&out).expect("stdout should be valid JSON");
    let imports = json["imports"].as_object().expect("imports object");

    // serde_json::Value sorts keys, so check declaration order on the raw text.
    let positions: Vec<usize> = [
        "\"application\":",
        "\"md5\":",
        "\"controllers/hello_controller\":",
        "\"controllers\":",
    ]
    .iter()
    .map(|key| out.find(key).unwrap_or_else(|| panic!("missing {key}")))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{out}");
    assert_eq!(imports.len(), 4);
    assert_eq!(imports["application"], "/assets/application-d74981ef.js");
    assert!(imports["controllers"]
        .as_str()
        .unwrap()
        .starts_with("/assets/controllers/index-"));
    assert!(!imports.contains_key("ghost"));
}

#[test]
fn test_missing_path_is_logged_and_skipped() {
    let dir = project();
    let output = pinmap(dir.path(), &["json"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Import map skipped missing path"), "{stderr}");
}

#[test]
fn test_preload_lists_preloaded_urls_in_order() {
    let dir = project();
    let out = stdout(&pinmap(dir.path(), &["preload"]));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "/assets/application-d74981ef.js");
    assert!(lines[1].starts_with("/assets/controllers/hello_controller-"));
    assert!(lines[2].starts_with("/assets/controllers/index-"));
}

#[test]
fn test_preload_json() {
    let dir = project();
    let out = stdout(&pinmap(dir.path(), &["--json", "preload"]));

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["paths"].as_array().unwrap().len(), 3);
}

#[test]
fn test_digest_is_stable_and_tracks_content() {
    let dir = project();
    let first = stdout(&pinmap(dir.path(), &["digest"])).trim().to_string();
    assert_eq!(first.len(), 40);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));

    let again = stdout(&pinmap(dir.path(), &["digest"])).trim().to_string();
    assert_eq!(first, again);

    write(dir.path(), "app/javascript/application.js", "changed");
    let changed = stdout(&pinmap(dir.path(), &["digest"])).trim().to_string();
    assert_ne!(first, changed);
}

#[test]
fn test_extension_flag_expands_jsx() {
    let dir = project();
    write(dir.path(), "app/javascript/controllers/clock.jsx", "tick");

    let without = stdout(&pinmap(dir.path(), &["json"]));
    assert!(!without.contains("controllers/clock"));

    let with = stdout(&pinmap(dir.path(), &["-e", "jsx", "json"]));
    let json: serde_json::Value = serde_json::from_str(&with).unwrap();
    let url = json["imports"]["controllers/clock"].as_str().unwrap();
    assert!(url.starts_with("/assets/controllers/clock-"));
    assert!(url.ends_with(".js"));
}

#[test]
fn test_pins_json_lists_expansion() {
    let dir = project();
    let out = stdout(&pinmap(dir.path(), &["--json", "pins"]));

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["packages"].as_array().unwrap().len(), 3);
    assert_eq!(json["directories"][0]["under"], "controllers");
    let expanded = json["expanded"].as_array().unwrap();
    assert_eq!(expanded.len(), 5);
    assert_eq!(expanded[4]["name"], "controllers");
    assert_eq!(expanded[4]["path"], "controllers/index.js");
}

#[test]
fn test_invalid_manifest_fails() {
    let dir = project();
    write(dir.path(), "config/importmap.json", r#"{"pins": [{"name": ""}]}"#);

    let output = pinmap(dir.path(), &["json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unable to import from"), "{stderr}");
}

#[test]
fn test_version() {
    let dir = tempdir().unwrap();
    let out = stdout(&pinmap(dir.path(), &["version"]));
    assert!(out.starts_with("pinmap "));
}
