//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::FinderError;

/// Exit codes for the dupesweep application.
///
/// - 0: Success (run completed, nothing failed)
/// - 1: General error (fatal enumeration/fingerprint error, bad config, ...)
/// - 2: Usage error (reported by clap before the run starts)
/// - 3: Partial success (run completed, some files failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed without any failure.
    Success = 0,
    /// General error: the run aborted before elimination.
    GeneralError = 1,
    /// Partial success: some deletions failed or some files were unreadable.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::PartialSuccess => "DS003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Path the error refers to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        let path = err.downcast_ref::<FinderError>().and_then(|e| match e {
            FinderError::PathNotFound(p) | FinderError::NotADirectory(p) => Some(p.as_path()),
            FinderError::Scan(e) => Some(e.path()),
            FinderError::Hash(e) => Some(e.path()),
            _ => None,
        });

        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            path: path.map(|p| p.display().to_string()),
        }
    }
}
