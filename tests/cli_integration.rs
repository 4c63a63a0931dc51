//! Integration tests for the `td` CLI.
//!
//! Each test creates a temp workspace, runs `td` as a subprocess,
//! and verifies stdout and/or the files under `tagdeck/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Get the path to the built `td` binary.
fn td_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("td");
    path
}

/// Run `td` with the given args in the given directory, returning (stdout, stderr, success).
fn run_td(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(td_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("TAGDECK_LOG")
        .output()
        .expect("failed to run td");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `td` expecting success, return stdout.
fn run_td_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(dir, args);
    if !success {
        panic!(
            "td {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `td` expecting failure, return stderr.
fn run_td_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(dir, args);
    if success {
        panic!("td {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

/// Temp dir with an initialized workspace owned by `alice`.
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["init", "--owner", "alice"]);
    tmp
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    let out = run_td_ok(tmp.path(), &["init", "--owner", "alice"]);
    assert!(out.contains("Initialized tagdeck workspace for alice"));

    let config = fs::read_to_string(tmp.path().join("tagdeck/config.toml")).unwrap();
    assert!(config.contains("id = \"alice\""));
    assert!(tmp.path().join("tagdeck/store.json").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = workspace();
    let err = run_td_err(tmp.path(), &["init"]);
    assert!(err.contains("already exists"));
    run_td_ok(tmp.path(), &["init", "--force", "--owner", "bob"]);
}

#[test]
fn test_outside_workspace_fails() {
    let tmp = TempDir::new().unwrap();
    let err = run_td_err(tmp.path(), &["show", "b1"]);
    assert!(err.contains("not a tagdeck workspace"));
}

#[test]
fn test_workspace_dir_flag() {
    let tmp = workspace();
    let elsewhere = TempDir::new().unwrap();
    let dir = tmp.path().to_string_lossy().to_string();
    run_td_ok(elsewhere.path(), &["-C", &dir, "set", "b1", "rust"]);
    let out = run_td_ok(tmp.path(), &["show", "b1"]);
    assert_eq!(out.trim(), "b1: #rust");
}

#[test]
fn test_discovers_from_subdirectory() {
    let tmp = workspace();
    let nested = tmp.path().join("notes/2024");
    fs::create_dir_all(&nested).unwrap();
    run_td_ok(&nested, &["set", "b1", "rust"]);
    assert_eq!(run_td_ok(tmp.path(), &["show", "b1"]).trim(), "b1: #rust");
}

// ---------------------------------------------------------------------------
// Set / show / tags
// ---------------------------------------------------------------------------

#[test]
fn test_set_then_show() {
    let tmp = workspace();
    let out = run_td_ok(
        tmp.path(),
        &["set", "b1", "React", "CSS", "--suggested", "AI"],
    );
    assert_eq!(out.trim(), "b1: #React #CSS #AI?");
    assert_eq!(run_td_ok(tmp.path(), &["show", "b1"]).trim(), "b1: #React #CSS #AI?");
}

#[test]
fn test_set_collapses_case_duplicates() {
    let tmp = workspace();
    let out = run_td_ok(tmp.path(), &["set", "b1", "React", "react", " REACT "]);
    assert_eq!(out.trim(), "b1: #React");
}

#[test]
fn test_set_reuses_registry_spelling() {
    let tmp = workspace();
    run_td_ok(tmp.path(), &["set", "b1", "React"]);
    let out = run_td_ok(tmp.path(), &["set", "b2", "react"]);
    assert_eq!(out.trim(), "b2: #React");

    let tags = run_td_ok(tmp.path(), &["tags"]);
    assert_eq!(tags.lines().count(), 1);
}

#[test]
fn test_set_empty_clears() {
    let tmp = workspace();
    run_td_ok(tmp.path(), &["set", "b1", "React"]);
    assert_eq!(run_td_ok(tmp.path(), &["set", "b1"]).trim(), "b1: (no tags)");
    // Registry keeps the tag
    assert!(run_td_ok(tmp.path(), &["tags"]).contains("React"));
}

#[test]
fn test_set_rejects_long_name_without_writing() {
    let tmp = workspace();
    let long = "x".repeat(51);
    let err = run_td_err(tmp.path(), &["set", "b1", "ok", &long]);
    assert!(err.contains("51 characters"));
    assert_eq!(run_td_ok(tmp.path(), &["tags"]).trim(), "no tags yet");
}

#[test]
fn test_show_unknown_content() {
    let tmp = workspace();
    assert_eq!(run_td_ok(tmp.path(), &["show", "nothing"]).trim(), "nothing: (no tags)");
}

#[test]
fn test_show_json() {
    let tmp = workspace();
    run_td_ok(tmp.path(), &["set", "b1", "React", "--suggested", "AI"]);
    let out = run_td_ok(tmp.path(), &["show", "b1", "--json"]);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["content"], "b1");
    assert_eq!(v["tags"][0]["name"], "React");
    assert_eq!(v["tags"][0]["confirmed"], true);
    assert_eq!(v["tags"][1]["name"], "AI");
    assert_eq!(v["tags"][1]["confirmed"], false);
}

#[test]
fn test_tags_json_lists_registry() {
    let tmp = workspace();
    run_td_ok(tmp.path(), &["set", "b1", "rust", "cli"]);
    let out = run_td_ok(tmp.path(), &["tags", "--json"]);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    let names: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["rust", "cli"]);
}

// ---------------------------------------------------------------------------
// Add / rm
// ---------------------------------------------------------------------------

#[test]
fn test_add_and_rm() {
    let tmp = workspace();
    let out = run_td_ok(tmp.path(), &["add", "b1", "rust"]);
    assert!(out.contains("Tag rust added"));
    assert!(out.contains("b1: #rust"));

    run_td_ok(tmp.path(), &["add", "b1", "cli"]);
    let out = run_td_ok(tmp.path(), &["rm", "b1", "RUST"]);
    assert!(out.contains("Tag rust removed"));
    assert!(out.contains("b1: #cli"));
}

#[test]
fn test_add_duplicate_is_noop() {
    let tmp = workspace();
    run_td_ok(tmp.path(), &["add", "b1", "rust"]);
    let out = run_td_ok(tmp.path(), &["add", "b1", "Rust"]);
    assert!(out.contains("already has tag Rust"));
    assert_eq!(run_td_ok(tmp.path(), &["show", "b1"]).trim(), "b1: #rust");
}

#[test]
fn test_add_empty_name_fails() {
    let tmp = workspace();
    let err = run_td_err(tmp.path(), &["add", "b1", "   "]);
    assert!(err.contains("tag name is empty"));
}

#[test]
fn test_add_respects_max_tags() {
    let tmp = workspace();
    let config_path = tmp.path().join("tagdeck/config.toml");
    let config = fs::read_to_string(&config_path).unwrap();
    fs::write(&config_path, config.replace("# max_tags = 10", "max_tags = 1")).unwrap();

    run_td_ok(tmp.path(), &["add", "b1", "rust"]);
    let err = run_td_err(tmp.path(), &["add", "b1", "cli"]);
    assert!(err.contains("maximum of 1 tags"));
}

#[test]
fn test_add_keeps_suggestions() {
    let tmp = workspace();
    run_td_ok(tmp.path(), &["set", "b1", "--suggested", "AI"]);
    let out = run_td_ok(tmp.path(), &["add", "b1", "rust"]);
    assert!(out.contains("b1: #AI? #rust"));
}

#[test]
fn test_rm_missing_tag_fails() {
    let tmp = workspace();
    let err = run_td_err(tmp.path(), &["rm", "b1", "rust"]);
    assert!(err.contains("has no tag rust"));
}

#[test]
fn test_read_only_workspace_refuses_writes() {
    let tmp = workspace();
    run_td_ok(tmp.path(), &["set", "b1", "rust"]);
    let config_path = tmp.path().join("tagdeck/config.toml");
    let config = fs::read_to_string(&config_path).unwrap();
    fs::write(&config_path, config.replace("read_only = false", "read_only = true")).unwrap();

    assert!(run_td_err(tmp.path(), &["add", "b1", "cli"]).contains("read-only"));
    assert!(run_td_err(tmp.path(), &["set", "b1", "cli"]).contains("read-only"));
    assert_eq!(run_td_ok(tmp.path(), &["show", "b1"]).trim(), "b1: #rust");
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[test]
fn test_recovery_empty() {
    let tmp = workspace();
    assert_eq!(
        run_td_ok(tmp.path(), &["recovery"]).trim(),
        "recovery log is empty"
    );
}

#[test]
fn test_failed_save_is_logged_for_recovery() {
    let tmp = workspace();
    // A corrupt store makes every write fail
    fs::write(tmp.path().join("tagdeck/store.json"), "{ not json").unwrap();

    let err = run_td_err(tmp.path(), &["set", "b1", "React"]);
    assert!(err.contains("malformed"));

    let out = run_td_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("sync"));
    assert!(out.contains("b1"));
    assert!(out.contains("React"));
}
