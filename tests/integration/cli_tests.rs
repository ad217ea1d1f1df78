use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

/// The binary with a clean environment and `home` as its config home.
fn command(home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dupesweep"));
    command
        .env_clear()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home);
    command
}

/// Run the binary with a clean environment and an empty config home.
fn dupesweep(args: &[&str]) -> (Output, TempDir) {
    let home = tempdir().unwrap();
    let output = command(home.path())
        .args(args)
        .output()
        .expect("failed to run dupesweep");
    (output, home)
}

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn hello_world_tree() -> TempDir {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    write(&dir.path().join("c.txt"), b"world");
    write(&dir.path().join("empty.txt"), b"");
    dir
}

#[test]
fn test_cli_deletes_duplicates_and_reports() {
    let dir = hello_world_tree();
    let root = dir.path().to_str().unwrap();

    let (output, _home) = dupesweep(&[root, "3"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0), "stdout: {stdout}");
    assert_eq!(stdout.matches("Deleted duplicate: ").count(), 1);
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Deleted: "));
    assert!(stdout.contains("Workers:          3"));
    assert!(stdout.contains("Enumeration:"));
    assert!(stdout.contains("Fingerprinting:"));
    assert!(stdout.contains("Elimination:"));
    assert!(stdout.contains("Total:"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn test_cli_json_dry_run() {
    let dir = hello_world_tree();
    let root = dir.path().to_str().unwrap();

    let (output, _home) = dupesweep(&[root, "--dry-run", "--output", "json", "-w", "2"]);
    assert_eq!(output.status.code(), Some(0));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["workers"], 2);
    assert_eq!(value["summary"]["files_scanned"], 3);
    assert_eq!(value["summary"]["duplicate_groups"], 1);
    assert_eq!(value["summary"]["deleted"], 1);
    assert_eq!(value["summary"]["dry_run"], true);
    assert_eq!(value["groups"].as_array().unwrap().len(), 2);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
}

#[test]
fn test_cli_relative_root_reports_absolute_paths() {
    let dir = hello_world_tree();
    let home = tempdir().unwrap();

    let output = command(home.path())
        .args([".", "--dry-run", "--output", "json"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run dupesweep");
    assert_eq!(output.status.code(), Some(0));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(Path::new(value["root"].as_str().unwrap()).is_absolute());
    for group in value["groups"].as_array().unwrap() {
        for path in group["paths"].as_array().unwrap() {
            assert!(Path::new(path.as_str().unwrap()).is_absolute());
        }
    }
}

#[test]
fn test_cli_missing_root_is_usage_error() {
    let (output, _home) = dupesweep(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ROOT"));
}

#[test]
fn test_cli_zero_workers_is_usage_error() {
    let dir = tempdir().unwrap();
    let (output, _home) = dupesweep(&[dir.path().to_str().unwrap(), "0"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_nonexistent_root_fails() {
    let (output, _home) = dupesweep(&["/definitely/not/a/real/dir"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[DS001]"));
}

#[test]
fn test_cli_json_errors() {
    let (output, _home) = dupesweep(&["/definitely/not/a/real/dir", "--json-errors"]);
    assert_eq!(output.status.code(), Some(1));

    // Log lines precede the JSON document on stderr.
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json = &stderr[stderr.find('{').expect("JSON error on stderr")..];
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["code"], "DS001");
    assert_eq!(value["exit_code"], 1);
    assert_eq!(value["path"], "/definitely/not/a/real/dir");
}

#[test]
fn test_cli_quiet_prints_nothing() {
    let dir = hello_world_tree();
    let (output, _home) = dupesweep(&[dir.path().to_str().unwrap(), "-q"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}
