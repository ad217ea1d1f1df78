//! JSON output formatter for run reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/data",
//!   "groups": [
//!     { "fingerprint": "ab12...", "paths": ["/data/a.txt", "/data/b.txt"] }
//!   ],
//!   "deleted": [ { "path": "/data/b.txt", "size": 5, "trashed": false } ],
//!   "failures": [ { "path": "/data/x", "error": "permission denied: /data/x" } ],
//!   "hash_failures": [],
//!   "summary": {
//!     "workers": 4,
//!     "files_scanned": 3,
//!     "bytes_scanned": 15,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "deleted": 1,
//!     "failed": 0,
//!     "bytes_freed": 5,
//!     "dry_run": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   },
//!   "timings_ms": { "enumeration": 1, "fingerprinting": 3, "elimination": 0, "total": 4 }
//! }
//! ```

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::actions::{DeleteFailure, DeleteResult};
use crate::duplicates::{GroupMap, PhaseTiming, RunReport};
use crate::error::ExitCode;

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Worker count used
    pub workers: usize,
    /// Files produced by enumeration
    pub files_scanned: usize,
    /// Total size of enumerated files in bytes
    pub bytes_scanned: u64,
    /// Groups with 2+ paths
    pub duplicate_groups: usize,
    /// Paths beyond the first in each group
    pub duplicate_files: usize,
    /// Files deleted (or that would be, in dry-run mode)
    pub deleted: usize,
    /// Files that could not be deleted
    pub failed: usize,
    /// Bytes freed
    pub bytes_freed: u64,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

/// Phase durations in milliseconds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JsonTimings {
    /// Directory walk
    pub enumeration: u64,
    /// Pool start until the group map was published
    pub fingerprinting: u64,
    /// Duplicate removal
    pub elimination: u64,
    /// Whole run
    pub total: u64,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl From<&PhaseTiming> for JsonTimings {
    fn from(timing: &PhaseTiming) -> Self {
        Self {
            enumeration: millis(timing.enumeration),
            fingerprinting: millis(timing.fingerprinting),
            elimination: millis(timing.elimination),
            total: millis(timing.total),
        }
    }
}

/// One file that could not be fingerprinted.
#[derive(Debug, Clone, Serialize)]
pub struct JsonHashFailure {
    /// File path
    pub path: String,
    /// Rendered error
    pub error: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Scanned root
    pub root: &'a Path,
    /// Every fingerprint group, ordered by fingerprint
    pub groups: &'a GroupMap,
    /// Removed files
    pub deleted: &'a [DeleteResult],
    /// Files that could not be removed
    pub failures: &'a [DeleteFailure],
    /// Files excluded because they could not be read
    pub hash_failures: Vec<JsonHashFailure>,
    /// Summary statistics
    pub summary: JsonSummary,
    /// Phase durations
    pub timings_ms: JsonTimings,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output from a run report and an exit code.
    #[must_use]
    pub fn new(report: &'a RunReport, exit_code: ExitCode) -> Self {
        let summary = &report.summary;
        let deletions = &report.deletions;

        Self {
            root: &report.root,
            groups: &report.groups,
            deleted: &deletions.successes,
            failures: &deletions.failures,
            hash_failures: summary
                .hash_failures
                .iter()
                .map(|e| JsonHashFailure {
                    path: e.path().display().to_string(),
                    error: e.to_string(),
                })
                .collect(),
            summary: JsonSummary {
                workers: summary.workers,
                files_scanned: summary.files_enumerated,
                bytes_scanned: summary.bytes_enumerated,
                duplicate_groups: summary.duplicate_groups,
                duplicate_files: summary.duplicate_files,
                deleted: deletions.success_count(),
                failed: deletions.failure_count(),
                bytes_freed: deletions.bytes_freed,
                dry_run: deletions.dry_run,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            timings_ms: JsonTimings::from(&report.timing),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        let json = self.to_json_pretty()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
