//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! [`Walker`] lazily enumerates every non-empty regular file below a root
//! directory. Traversal is single-threaded and depth-first with entries
//! sorted by file name, but callers must not rely on that order.
//!
//! # Error policy
//!
//! - An entry that vanishes between listing and stat is skipped.
//! - Any other traversal failure is yielded as a [`ScanError`]; the pipeline
//!   treats it as fatal and stops consuming the iterator.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files: Result<Vec<_>, _> = walker.walk().collect();
//! println!("Found {} files", files.map(|f| f.len()).unwrap_or(0));
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Sequential directory walker producing candidate files.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// The iterator is lazy and finite; re-invoke `walk` to start over.
    /// Symbolic links are reported by walkdir as links and never followed,
    /// so they are filtered out along with directories and special files.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;
        let min_size = self.config.effective_min_size();

        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && is_hidden(entry)))
            .filter_map(move |result| match result {
                Ok(entry) => self.process_entry(entry, min_size),
                Err(e) => self.handle_walk_error(e),
            })
    }

    fn process_entry(
        &self,
        entry: DirEntry,
        min_size: u64,
    ) -> Option<Result<FileEntry, ScanError>> {
        if !entry.file_type().is_file() {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return self.handle_walk_error(e),
        };

        let size = metadata.len();
        if size < min_size {
            if size == 0 {
                log::debug!("Skipping empty file: {}", entry.path().display());
            } else {
                log::trace!(
                    "Skipping file below size filter ({}): {}",
                    size,
                    entry.path().display()
                );
            }
            return None;
        }

        Some(Ok(FileEntry::new(entry.into_path(), size)))
    }

    /// Map a walkdir error, dropping entries that vanished mid-walk.
    fn handle_walk_error(
        &self,
        error: walkdir::Error,
    ) -> Option<Result<FileEntry, ScanError>> {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let kind = error.io_error().map(std::io::Error::kind);

        match classify_walk_error(kind, error.depth()) {
            WalkFailure::Vanished => {
                log::debug!("Entry vanished during scan: {}", path.display());
                None
            }
            WalkFailure::PermissionDenied => {
                log::error!("Permission denied: {}", path.display());
                Some(Err(ScanError::PermissionDenied(path)))
            }
            WalkFailure::Fatal => {
                log::error!("Walker error for {}: {}", path.display(), error);
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                Some(Err(ScanError::Io { path, source }))
            }
        }
    }
}

/// How a traversal failure affects the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkFailure {
    /// Entry disappeared after its parent was listed; skip it
    Vanished,
    /// Directory or metadata could not be read; abort
    PermissionDenied,
    /// Anything else, including a missing root or a link loop; abort
    Fatal,
}

/// Decide the fate of a walkdir error from its I/O kind and depth.
///
/// `kind` is `None` for errors without an underlying I/O error (loops).
/// Depth 0 is the root itself, which must never be silently skipped.
fn classify_walk_error(kind: Option<ErrorKind>, depth: usize) -> WalkFailure {
    match kind {
        Some(ErrorKind::NotFound) if depth > 0 => WalkFailure::Vanished,
        Some(ErrorKind::PermissionDenied) => WalkFailure::PermissionDenied,
        _ => WalkFailure::Fatal,
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
