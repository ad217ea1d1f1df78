//! Output formatters for run reports.
//!
//! - Text for humans
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::DeleteConfig;
//! use dupesweep::duplicates::DuplicateFinder;
//! use dupesweep::error::ExitCode;
//! use dupesweep::output::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.run(Path::new("."), &DeleteConfig::default().with_dry_run(true)).unwrap();
//!
//! let output = JsonOutput::new(&report, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
