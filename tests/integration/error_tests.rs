use dupesweep::actions::DeleteConfig;
use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError, HashErrorPolicy};
use dupesweep::scanner::{HashError, ScanError};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_non_existent_path() {
    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(Path::new("/non/existent/path/12345"));

    match result {
        Err(FinderError::PathNotFound(path)) => {
            assert!(path.to_string_lossy().contains("non/existent/path/12345"));
        }
        other => panic!("Expected PathNotFound error, got {:?}", other),
    }
}

#[test]
fn test_scan_file_instead_of_directory() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("file.txt");
    write(&file_path, b"x");

    let result = DuplicateFinder::with_defaults().find_duplicates(&file_path);

    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[cfg(unix)]
fn lock(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_aborts_without_deleting() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    let sub = dir.path().join("no_access");
    fs::create_dir(&sub).unwrap();
    write(&sub.join("inner.txt"), b"hello");
    lock(&sub, 0o000);

    if fs::read_dir(&sub).is_ok() {
        // Permissions are not enforced for this user (e.g. root).
        lock(&sub, 0o755);
        return;
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
    let result = finder.run(dir.path(), &DeleteConfig::default());
    lock(&sub, 0o755);

    match result {
        Err(FinderError::Scan(ScanError::PermissionDenied(path))) => assert_eq!(path, sub),
        other => panic!("Expected PermissionDenied scan error, got {:?}", other),
    }
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.txt").exists());
    assert!(sub.join("inner.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_aborts_by_default() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    let locked = dir.path().join("locked.txt");
    write(&locked, b"secret");
    lock(&locked, 0o000);

    if File::open(&locked).is_ok() {
        lock(&locked, 0o644);
        return;
    }

    let result = DuplicateFinder::with_defaults().run(dir.path(), &DeleteConfig::default());
    lock(&locked, 0o644);

    match result {
        Err(FinderError::Hash(HashError::PermissionDenied(path))) => assert_eq!(path, locked),
        other => panic!("Expected hash PermissionDenied, got {:?}", other),
    }
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_reported_under_keep_going() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    let locked = dir.path().join("locked.txt");
    write(&locked, b"hello");
    lock(&locked, 0o000);

    if File::open(&locked).is_ok() {
        lock(&locked, 0o644);
        return;
    }

    let config = FinderConfig::default()
        .with_workers(2)
        .with_hash_error_policy(HashErrorPolicy::Report);
    let report = DuplicateFinder::new(config)
        .run(dir.path(), &DeleteConfig::default())
        .unwrap();
    lock(&locked, 0o644);

    assert_eq!(report.summary.hash_failures.len(), 1);
    assert_eq!(report.summary.hash_failures[0].path(), locked.as_path());
    assert_eq!(report.groups.path_count(), 2);
    assert_eq!(report.deletions.success_count(), 1);
    assert!(locked.exists(), "a file that failed to hash is never deleted");
    assert!(report.is_partial());
}

#[test]
fn test_deletion_failure_does_not_abort_run() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"one");
    write(&dir.path().join("b"), b"one");
    write(&dir.path().join("c"), b"two");
    write(&dir.path().join("d"), b"two");

    // Paranoid mode against a keeper that vanished after scanning makes the
    // first group's candidate fail while the second group still proceeds.
    let finder = DuplicateFinder::with_defaults();
    let outcome = finder.find_duplicates(dir.path()).unwrap();
    let first = outcome.groups.duplicate_groups().next().unwrap();
    fs::remove_file(first.keeper().unwrap()).unwrap();

    let result = dupesweep::actions::eliminate_duplicates(
        &outcome.groups,
        &DeleteConfig::default().with_paranoid(true),
        &dupesweep::progress::NoopObserver,
    );

    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.success_count(), 1);
    assert!(first.redundant()[0].exists());
}
