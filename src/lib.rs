//! dupesweep - concurrent duplicate file eliminator
//!
//! Walks a directory tree, fingerprints every non-empty regular file with
//! BLAKE3 on a fixed pool of workers, groups files by fingerprint, and
//! removes every duplicate except the first one in each group.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application for a parsed command line.
///
/// # Errors
///
/// Returns an error for invalid configuration and for any fatal pipeline
/// error. In both cases nothing has been deleted.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(&cli)?;
    let json = cli.output == OutputFormat::Json;

    let progress = Arc::new(Progress::new(cli.quiet || json, !cli.quiet && !json));
    let finder = DuplicateFinder::new(config.finder_config().with_observer(progress));

    let report = match finder.run(&cli.root, &config.delete_config()) {
        Ok(report) => report,
        Err(e) => {
            log::error!("Run aborted, nothing deleted: {}", e);
            return Err(e.into());
        }
    };

    let exit_code = if report.is_partial() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        JsonOutput::new(&report, exit_code)
            .write_to(&mut out)
            .context("Failed to write JSON report")?;
    } else if !cli.quiet {
        TextOutput::new(&report)
            .write_to(&mut out)
            .context("Failed to write report")?;
    }
    out.flush().context("Failed to flush stdout")?;

    Ok(exit_code)
}
