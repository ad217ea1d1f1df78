//! Command-line interface definitions for dupesweep.
//!
//! This module defines all CLI arguments using the clap derive API. Every
//! option that also exists in the configuration file is optional here, so
//! that an absent flag leaves the file or environment value in effect.
//!
//! # Example
//!
//! ```bash
//! # Delete duplicates under ~/Downloads with one worker
//! dupesweep ~/Downloads
//!
//! # Eight workers, report only, JSON output
//! dupesweep ~/Downloads 8 --dry-run --output json
//!
//! # Keep going past unreadable files and confirm each match byte for byte
//! dupesweep ~/Downloads -w 4 --keep-going --paranoid
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Concurrent duplicate file eliminator.
///
/// Fingerprints every non-empty regular file under ROOT with a pool of
/// workers, groups files by content, and removes every duplicate except the
/// first one found.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Number of fingerprint workers (default: 1)
    #[arg(value_name = "WORKERS", value_parser = clap::value_parser!(u64).range(1..))]
    pub workers_positional: Option<u64>,

    /// Number of fingerprint workers (same as WORKERS)
    #[arg(
        short,
        long,
        value_name = "N",
        conflicts_with = "workers_positional",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub workers: Option<u64>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Compare each duplicate byte for byte with the kept file before deleting
    #[arg(long)]
    pub paranoid: bool,

    /// Move duplicates to the system trash instead of permanently deleting them
    ///
    /// Trashed files are relocated, not removed, so no space is reclaimed
    /// until the trash is emptied.
    #[arg(long)]
    pub trash: bool,

    /// Exclude unreadable files and continue instead of aborting the run
    #[arg(long)]
    pub keep_going: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Capacity of the internal hand-off queues (0 for rendezvous)
    #[arg(long, value_name = "N")]
    pub queue_depth: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Worker count from either the positional or the flag form.
    #[must_use]
    pub fn worker_count(&self) -> Option<usize> {
        self.workers
            .or(self.workers_positional)
            .and_then(|n| usize::try_from(n).ok())
    }
}

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupesweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
