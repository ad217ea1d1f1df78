use dupesweep::actions::DeleteConfig;
use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn remaining(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = list_files(dir);
    names.sort();
    names
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        if path.is_dir() {
            out.extend(list_files(&path));
        } else {
            out.push(path.strip_prefix(dir).unwrap().display().to_string());
        }
    }
    out
}

#[test]
fn test_hello_world_scenario_leaves_two_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    write(&dir.path().join("c.txt"), b"world");
    write(&dir.path().join("empty.txt"), b"");

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(2));
    let report = finder.run(dir.path(), &DeleteConfig::default()).unwrap();

    assert_eq!(report.deletions.success_count(), 1);
    assert_eq!(report.deletions.bytes_freed, 5);
    assert!(dir.path().join("c.txt").exists());
    assert!(dir.path().join("empty.txt").exists());

    let a = dir.path().join("a.txt").exists();
    let b = dir.path().join("b.txt").exists();
    assert!(a ^ b, "exactly one of a.txt and b.txt must remain");

    // Two non-empty files remain, plus the untouched empty file.
    let non_empty = remaining(dir.path())
        .into_iter()
        .filter(|n| n != "empty.txt")
        .count();
    assert_eq!(non_empty, 2);
}

#[test]
fn test_kept_file_is_first_in_group() {
    let dir = tempdir().unwrap();
    for name in ["one", "two", "three"] {
        write(&dir.path().join(name), b"triplicate");
    }

    let report = DuplicateFinder::with_defaults()
        .run(dir.path(), &DeleteConfig::default())
        .unwrap();

    let group = report.groups.iter().next().unwrap();
    assert_eq!(group.len(), 3);
    assert!(group.keeper().unwrap().exists());
    for path in group.redundant() {
        assert!(!path.exists());
    }
}

#[test]
fn test_second_run_finds_nothing() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write(&dir.path().join("x1"), b"xxx");
    write(&sub.join("x2"), b"xxx");
    write(&sub.join("x3"), b"xxx");
    write(&dir.path().join("y1"), b"yyyy");
    write(&sub.join("y2"), b"yyyy");

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));

    let first = finder.run(dir.path(), &DeleteConfig::default()).unwrap();
    assert_eq!(first.summary.duplicate_groups, 2);
    assert_eq!(first.deletions.success_count(), 3);
    assert_eq!(remaining(dir.path()).len(), 2);

    let second = finder.run(dir.path(), &DeleteConfig::default()).unwrap();
    assert_eq!(second.summary.duplicate_groups, 0);
    assert_eq!(second.deletions.total_count(), 0);
    assert_eq!(remaining(dir.path()).len(), 2);
}

#[test]
fn test_dry_run_deletes_nothing() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"dup");
    write(&dir.path().join("b"), b"dup");

    let report = DuplicateFinder::with_defaults()
        .run(dir.path(), &DeleteConfig::default().with_dry_run(true))
        .unwrap();

    assert!(report.deletions.dry_run);
    assert_eq!(report.deletions.success_count(), 1);
    assert_eq!(remaining(dir.path()).len(), 2);
}

#[test]
fn test_paranoid_mode_deletes_true_duplicates() {
    let dir = tempdir().unwrap();
    let content = vec![42u8; 100_000];
    write(&dir.path().join("a"), &content);
    write(&dir.path().join("b"), &content);

    let report = DuplicateFinder::with_defaults()
        .run(dir.path(), &DeleteConfig::default().with_paranoid(true))
        .unwrap();

    assert!(report.deletions.all_succeeded());
    assert_eq!(report.deletions.success_count(), 1);
    assert_eq!(remaining(dir.path()).len(), 1);
}

#[test]
fn test_timings_are_recorded() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"dup");
    write(&dir.path().join("b"), b"dup");

    let report = DuplicateFinder::with_defaults()
        .run(dir.path(), &DeleteConfig::default())
        .unwrap();

    let timing = report.timing;
    assert!(timing.total >= timing.elimination);
    assert!(timing.total >= timing.fingerprinting);
    assert!(timing.fingerprinting >= timing.enumeration);
}
