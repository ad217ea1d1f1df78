//! File actions module.
//!
//! This module provides duplicate elimination:
//! - Permanent deletion (default)
//! - Move to system trash via the trash crate
//! - Dry-run reporting
//! - Byte-for-byte confirmation before deleting
//!
//! ```no_run
//! use dupesweep::actions::permanent_delete;
//! use std::path::Path;
//!
//! let result = permanent_delete(Path::new("/path/to/duplicate.txt"));
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_to_trash, eliminate_duplicates, files_identical, permanent_delete, BatchDeleteResult,
    DeleteConfig, DeleteError, DeleteFailure, DeleteResult,
};
