//! Pipeline observation and terminal progress reporting.
//!
//! The pipeline never writes to the console itself. Every user-visible
//! event (state transitions, per-file results, deletions, phase timings) is
//! delivered to an injected [`PipelineObserver`]. The CLI installs
//! [`Progress`], which draws an indicatif spinner on stderr and announces
//! deletions on stdout; tests install their own recorder or [`NoopObserver`].

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::actions::DeleteError;
use crate::duplicates::{Pair, Phase, PipelineState};
use crate::scanner::{FileEntry, HashError};

/// Receiver of pipeline events.
///
/// Methods may be called from the enumerating thread, the aggregator thread
/// and the coordinator, so implementations must be thread-safe. All methods
/// default to doing nothing.
pub trait PipelineObserver: Send + Sync {
    /// The coordinator entered a new state.
    fn on_state_change(&self, _state: PipelineState) {}

    /// The enumerator produced a file.
    fn on_file_discovered(&self, _file: &FileEntry) {}

    /// The aggregator received a fingerprint.
    fn on_file_hashed(&self, _pair: &Pair) {}

    /// A worker could not fingerprint a file.
    fn on_hash_failed(&self, _error: &HashError) {}

    /// A duplicate was removed (or would be, in dry-run mode).
    fn on_deleted(&self, _path: &Path, _size: u64, _dry_run: bool) {}

    /// A duplicate could not be removed.
    fn on_delete_failed(&self, _path: &Path, _error: &DeleteError) {}

    /// A phase finished after `elapsed`.
    fn on_phase_end(&self, _phase: Phase, _elapsed: Duration) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Progress reporter using indicatif.
///
/// Shows a spinner with discovered/hashed counts while the pipeline runs
/// and prints one stdout line per deleted file.
pub struct Progress {
    spinner: Mutex<Option<ProgressBar>>,
    discovered: AtomicU64,
    hashed: AtomicU64,
    quiet: bool,
    announce_deletions: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// * `quiet` - suppress the spinner
    /// * `announce_deletions` - print one line per deleted file on stdout
    ///
    /// ```
    /// use dupesweep::progress::Progress;
    ///
    /// let progress = Progress::new(false, true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool, announce_deletions: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            discovered: AtomicU64::new(0),
            hashed: AtomicU64::new(0),
            quiet,
            announce_deletions,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn refresh(&self) {
        if let Ok(guard) = self.spinner.lock() {
            if let Some(ref pb) = *guard {
                pb.set_message(format!(
                    "{} files found, {} fingerprinted",
                    self.discovered.load(Ordering::Relaxed),
                    self.hashed.load(Ordering::Relaxed)
                ));
            }
        }
    }

    fn start_spinner(&self) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        pb.set_style(Self::spinner_style());
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
        self.refresh();
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl PipelineObserver for Progress {
    fn on_state_change(&self, state: PipelineState) {
        match state {
            PipelineState::Hashing => self.start_spinner(),
            PipelineState::Aggregated | PipelineState::Done => self.finish_spinner(),
            _ => {}
        }
    }

    fn on_file_discovered(&self, _file: &FileEntry) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
        self.refresh();
    }

    fn on_file_hashed(&self, _pair: &Pair) {
        self.hashed.fetch_add(1, Ordering::Relaxed);
        self.refresh();
    }

    fn on_deleted(&self, path: &Path, _size: u64, dry_run: bool) {
        if !self.announce_deletions {
            return;
        }
        if dry_run {
            println!("Would delete: {}", path.display());
        } else {
            println!("Deleted duplicate: {}", path.display());
        }
    }
}
