//! Plain-text run report.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use bytesize::ByteSize;

use crate::duplicates::RunReport;

/// Human-readable summary of a run.
pub struct TextOutput<'a> {
    report: &'a RunReport,
}

impl<'a> TextOutput<'a> {
    /// Wrap a finished run.
    #[must_use]
    pub fn new(report: &'a RunReport) -> Self {
        Self { report }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let summary = &self.report.summary;
        let deletions = &self.report.deletions;
        let timing = &self.report.timing;
        let verb = if deletions.dry_run {
            "Would delete"
        } else {
            "Deleted"
        };

        let scanned = format!(
            "{} ({})",
            summary.files_enumerated,
            ByteSize(summary.bytes_enumerated)
        );
        let removed = format!(
            "{} ({} freed)",
            deletions.success_count(),
            ByteSize(deletions.bytes_freed)
        );

        row(w, "Workers:", summary.workers)?;
        row(w, "Files scanned:", scanned)?;
        row(w, "Duplicate groups:", summary.duplicate_groups)?;
        row(w, &format!("{verb}:"), removed)?;
        if !deletions.all_succeeded() {
            row(w, "Failed:", deletions.failure_count())?;
        }
        if !summary.hash_failures.is_empty() {
            row(w, "Unreadable:", summary.hash_failures.len())?;
        }
        row(w, "Enumeration:", fmt_duration(timing.enumeration))?;
        row(w, "Fingerprinting:", fmt_duration(timing.fingerprinting))?;
        row(w, "Elimination:", fmt_duration(timing.elimination))?;
        row(w, "Total:", fmt_duration(timing.total))?;
        Ok(())
    }
}

fn row<W: Write>(w: &mut W, label: &str, value: impl fmt::Display) -> io::Result<()> {
    writeln!(w, "{:<18}{}", label, value)
}

fn fmt_duration(d: Duration) -> String {
    format!("{:.3}s", d.as_secs_f64())
}
