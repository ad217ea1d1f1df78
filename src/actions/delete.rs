//! Duplicate elimination.
//!
//! # Overview
//!
//! For every group with two or more paths, the first path (by arrival order)
//! is kept and every later path is removed:
//! - Permanent deletion by default
//! - Move to system trash when configured
//! - Dry-run reporting without touching the filesystem
//! - Optional byte-for-byte confirmation against the kept file
//!
//! A failure on one path is logged, reported to the observer and recorded in
//! the [`BatchDeleteResult`]; the remaining paths and groups are still
//! processed.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::delete::{eliminate_duplicates, DeleteConfig};
//! use dupesweep::duplicates::GroupMap;
//! use dupesweep::progress::NoopObserver;
//!
//! let groups = GroupMap::new();
//! let result = eliminate_duplicates(&groups, &DeleteConfig::default(), &NoopObserver);
//! println!("{}", result.summary());
//! ```

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde::Serialize;
use thiserror::Error;

use crate::duplicates::GroupMap;
use crate::progress::PipelineObserver;

/// Chunk size for paranoid comparison.
const COMPARE_CHUNK: usize = 32 * 1024;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Content differs from the kept file; the candidate was left alone.
    #[error("content differs from {kept}: {path}")]
    ContentMismatch { path: PathBuf, kept: PathBuf },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::ContentMismatch { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether the file went to the trash instead of being removed.
    pub trashed: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, trashed: bool) -> Self {
        Self {
            path,
            size,
            trashed,
        }
    }
}

/// One path that could not be removed.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteFailure {
    /// Path that was left in place.
    pub path: PathBuf,
    /// Rendered error.
    pub error: String,
}

/// Results of an elimination pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDeleteResult {
    /// Successfully deleted files (or files that would be, in dry-run mode).
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<DeleteFailure>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run {
            "Would delete"
        } else {
            "Deleted"
        };
        if self.all_succeeded() {
            format!(
                "{} {} file(s), {} freed",
                verb,
                self.success_count(),
                ByteSize(self.bytes_freed)
            )
        } else {
            format!(
                "{} {} file(s), {} failed, {} freed",
                verb,
                self.success_count(),
                self.failure_count(),
                ByteSize(self.bytes_freed)
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Move files to the system trash instead of removing them.
    pub trash: bool,
    /// Report what would be deleted without touching anything.
    pub dry_run: bool,
    /// Compare each candidate byte for byte with the kept file first.
    pub paranoid: bool,
}

impl DeleteConfig {
    /// Enable/disable trash mode.
    #[must_use]
    pub fn with_trash(mut self, trash: bool) -> Self {
        self.trash = trash;
        self
    }

    /// Enable/disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable/disable byte-for-byte confirmation.
    #[must_use]
    pub fn with_paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }
}

fn file_size(path: &Path) -> Result<u64, DeleteError> {
    fs::symlink_metadata(path)
        .map(|m| m.len())
        .map_err(|e| DeleteError::from_io(path, e))
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::debug!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Permanently delete a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;

    log::debug!("Deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Check whether two files have identical content.
///
/// Sizes are compared first; contents are then streamed in fixed chunks.
///
/// # Errors
///
/// Returns the first I/O error encountered on either file.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut left = File::open(a)?;
    let mut right = File::open(b)?;
    let mut left_buf = vec![0u8; COMPARE_CHUNK];
    let mut right_buf = vec![0u8; COMPARE_CHUNK];

    loop {
        let n = read_full(&mut left, &mut left_buf)?;
        let m = read_full(&mut right, &mut right_buf)?;
        if n != m || left_buf[..n] != right_buf[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns the byte count.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Remove one candidate according to `config`.
fn remove_candidate(
    path: &Path,
    kept: &Path,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    if config.paranoid {
        match files_identical(kept, path) {
            Ok(true) => {}
            Ok(false) => {
                return Err(DeleteError::ContentMismatch {
                    path: path.to_path_buf(),
                    kept: kept.to_path_buf(),
                });
            }
            Err(e) => return Err(DeleteError::from_io(path, e)),
        }
    }

    if config.dry_run {
        let size = file_size(path)?;
        return Ok(DeleteResult::new(path.to_path_buf(), size, config.trash));
    }

    if config.trash {
        delete_to_trash(path)
    } else {
        permanent_delete(path)
    }
}

/// Keep the first path of every duplicate group and remove the rest.
///
/// Groups are visited in fingerprint order; within a group, candidates are
/// visited in arrival order. Never aborts on a per-file failure.
pub fn eliminate_duplicates(
    groups: &GroupMap,
    config: &DeleteConfig,
    observer: &dyn PipelineObserver,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult {
        dry_run: config.dry_run,
        ..BatchDeleteResult::default()
    };

    for group in groups.duplicate_groups() {
        let Some(kept) = group.keeper() else {
            continue;
        };
        log::debug!(
            "Keeping {} ({} duplicate(s))",
            kept.display(),
            group.redundant().len()
        );

        for path in group.redundant() {
            match remove_candidate(path, kept, config) {
                Ok(deleted) => {
                    observer.on_deleted(&deleted.path, deleted.size, config.dry_run);
                    result.bytes_freed += deleted.size;
                    result.successes.push(deleted);
                }
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", path.display(), e);
                    observer.on_delete_failed(path, &e);
                    result.failures.push(DeleteFailure {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    log::info!("{}", result.summary());

    result
}
