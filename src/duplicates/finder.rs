//! Pipeline coordinator.
//!
//! # Overview
//!
//! [`DuplicateFinder`] wires the enumerator, the worker pool and the
//! aggregator together through two bounded hand-off streams:
//!
//! ```text
//! Walker ──paths──▶ WorkerPool (N) ──pairs──▶ GroupAggregator ──▶ GroupMap
//! ```
//!
//! The run moves through the states of [`PipelineState`]:
//!
//! 1. **Idle** - validate the root.
//! 2. **Hashing** - start the aggregator and every worker, then enumerate on
//!    the calling thread while workers consume concurrently.
//! 3. **Draining** - enumeration has finished or failed, so the path sender
//!    is dropped; workers finish what is buffered and exit.
//! 4. **Aggregated** - the worker barrier has resolved, so the pair stream
//!    is disconnected and the aggregator's map is collected.
//! 5. **Eliminating / Done** - only through [`DuplicateFinder::run`].
//!
//! Fatal errors (enumeration failure, or a hash failure under
//! [`HashErrorPolicy::Abort`]) are returned before elimination starts, so a
//! failed run never deletes anything.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::DeleteConfig;
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
//! let report = finder.run(Path::new("/some/path"), &DeleteConfig::default()).unwrap();
//!
//! println!("{}", report.deletions.summary());
//! println!("total: {:?}", report.timing.total);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Sender};
use serde::Serialize;

use super::aggregator::{AggregateOutcome, GroupAggregator};
use super::groups::GroupMap;
use super::workers::{HashErrorPolicy, WorkerContext, WorkerPool};
use crate::actions::{eliminate_duplicates, BatchDeleteResult, DeleteConfig};
use crate::progress::{NoopObserver, PipelineObserver};
use crate::scanner::{FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Default capacity of each hand-off stream.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Coordinator states, in the order a successful run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PipelineState {
    /// Nothing started yet
    Idle,
    /// Enumeration and hashing running concurrently
    Hashing,
    /// Path stream closed; workers finishing buffered items
    Draining,
    /// All workers done; aggregator has published its map
    Aggregated,
    /// Duplicate elimination in progress
    Eliminating,
    /// Run complete
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Hashing => "enumerating+hashing",
            Self::Draining => "draining",
            Self::Aggregated => "aggregated",
            Self::Eliminating => "eliminating",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Timed phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Directory walk
    Enumeration,
    /// Pool start until the aggregator publishes
    Fingerprinting,
    /// Duplicate removal
    Elimination,
}

/// Elapsed time per phase. Diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTiming {
    /// Time spent walking the tree
    pub enumeration: Duration,
    /// Time from pool start until the group map was published
    pub fingerprinting: Duration,
    /// Time spent removing duplicates
    pub elimination: Duration,
    /// Wall-clock time of the whole run
    pub total: Duration,
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of fingerprint workers (at least one).
    pub workers: usize,
    /// Capacity of the path and pair streams. Zero means rendezvous.
    pub queue_depth: usize,
    /// Read buffer size for fingerprinting.
    pub buffer_size: usize,
    /// What to do when a file cannot be fingerprinted.
    pub on_hash_error: HashErrorPolicy,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Receiver of pipeline events.
    pub observer: Arc<dyn PipelineObserver>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("queue_depth", &self.queue_depth)
            .field("buffer_size", &self.buffer_size)
            .field("on_hash_error", &self.on_hash_error)
            .field("walker_config", &self.walker_config)
            .field("observer", &"<observer>")
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            buffer_size: crate::scanner::DEFAULT_BUFFER_SIZE,
            on_hash_error: HashErrorPolicy::Abort,
            walker_config: WalkerConfig::default(),
            observer: Arc::new(NoopObserver),
        }
    }
}

impl FinderConfig {
    /// Set the worker count (clamped to at least one).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the hand-off stream capacity.
    #[must_use]
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth;
        self
    }

    /// Set the fingerprint read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the hash failure policy.
    #[must_use]
    pub fn with_hash_error_policy(mut self, policy: HashErrorPolicy) -> Self {
        self.on_hash_error = policy;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the event observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }
}

/// Statistics from the scan half of a run.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Files produced by the enumerator
    pub files_enumerated: usize,
    /// Bytes across all enumerated files
    pub bytes_enumerated: u64,
    /// Files that received a fingerprint
    pub files_hashed: usize,
    /// Distinct fingerprints
    pub groups: usize,
    /// Groups with 2+ members
    pub duplicate_groups: usize,
    /// Paths beyond the first in each group
    pub duplicate_files: usize,
    /// Per-file failures (only under [`HashErrorPolicy::Report`])
    pub hash_failures: Vec<HashError>,
    /// Worker count used
    pub workers: usize,
    /// Enumeration time
    pub enumeration_time: Duration,
    /// Fingerprinting time
    pub fingerprinting_time: Duration,
}

/// Result of [`DuplicateFinder::find_duplicates`].
#[derive(Debug)]
pub struct ScanOutcome {
    /// Absolute root that was scanned
    pub root: PathBuf,
    /// Completed, immutable group map
    pub groups: GroupMap,
    /// Scan statistics
    pub summary: ScanSummary,
}

/// Result of a full [`DuplicateFinder::run`].
#[derive(Debug)]
pub struct RunReport {
    /// Root that was scanned
    pub root: PathBuf,
    /// Group map the eliminator worked from
    pub groups: GroupMap,
    /// Scan statistics
    pub summary: ScanSummary,
    /// Elimination results
    pub deletions: BatchDeleteResult,
    /// Phase durations
    pub timing: PhaseTiming,
}

impl RunReport {
    /// Whether anything failed without aborting the run.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.summary.hash_failures.is_empty() || !self.deletions.all_succeeded()
    }
}

/// Errors that abort a run before elimination.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory traversal failed.
    #[error("Enumeration failed: {0}")]
    Scan(#[from] ScanError),

    /// A file could not be fingerprinted under the abort policy.
    #[error("Fingerprinting failed: {0}")]
    Hash(#[from] HashError),

    /// The worker pool could not be built.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A pipeline thread could not be spawned.
    #[error("Failed to spawn pipeline thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The aggregator thread panicked.
    #[error("Aggregator thread panicked")]
    AggregatorPanicked,
}

/// Coordinator for the enumerate → fingerprint → aggregate → eliminate run.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new().with_buffer_size(config.buffer_size);
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    fn enter(&self, state: PipelineState) {
        log::debug!("Pipeline state: {}", state);
        self.config.observer.on_state_change(state);
    }

    /// Scan `root` and group every non-empty regular file by fingerprint.
    ///
    /// # Errors
    ///
    /// - `PathNotFound` / `NotADirectory` for an invalid root
    /// - `Scan` if traversal fails anywhere below the root
    /// - `Hash` if a file cannot be read under [`HashErrorPolicy::Abort`]
    /// - `ThreadPool`, `Spawn`, `AggregatorPanicked` for pipeline failures
    pub fn find_duplicates(&self, root: &Path) -> Result<ScanOutcome, FinderError> {
        self.enter(PipelineState::Idle);

        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        // Every enumerated path is joined onto the root, so an absolute root
        // yields absolute paths throughout the group map and reports.
        let root = std::path::absolute(root).map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let walker = Walker::new(&root, self.config.walker_config.clone());
        let entries = walker.walk();
        self.scan_entries(&root, entries)
    }

    /// Run the concurrent stages over an already-validated root, fed by
    /// `entries`.
    pub(crate) fn scan_entries<I>(
        &self,
        root: &Path,
        entries: I,
    ) -> Result<ScanOutcome, FinderError>
    where
        I: IntoIterator<Item = Result<FileEntry, ScanError>>,
    {
        let pool = WorkerPool::new(self.config.workers)?;
        let workers = pool.size();
        log::info!("Scanning {} with {} worker(s)", root.display(), workers);
        log::debug!(
            "Queue depth {}, read buffer {} bytes",
            self.config.queue_depth,
            self.hasher.buffer_size()
        );

        let (path_tx, path_rx) = bounded::<FileEntry>(self.config.queue_depth);
        let (pair_tx, pair_rx) = bounded(self.config.queue_depth);
        let context = WorkerContext {
            hasher: Arc::clone(&self.hasher),
            abort: Arc::new(AtomicBool::new(false)),
            policy: self.config.on_hash_error,
        };

        let fingerprint_start = Instant::now();

        // Consumers exist before the first path is produced.
        let aggregator = GroupAggregator::new(Arc::clone(&self.config.observer))
            .spawn(pair_rx)
            .map_err(FinderError::Spawn)?;
        let workers_done = pool.start(path_rx, pair_tx, &context);
        self.enter(PipelineState::Hashing);

        let enumeration_start = Instant::now();
        let enumeration = self.enumerate(entries, path_tx, &context.abort);
        let enumeration_time = enumeration_start.elapsed();
        self.config
            .observer
            .on_phase_end(Phase::Enumeration, enumeration_time);

        self.enter(PipelineState::Draining);
        workers_done.wait();

        let outcome = aggregator
            .join()
            .map_err(|_| FinderError::AggregatorPanicked)?;
        let fingerprinting_time = fingerprint_start.elapsed();
        self.config
            .observer
            .on_phase_end(Phase::Fingerprinting, fingerprinting_time);
        self.enter(PipelineState::Aggregated);

        let (files_enumerated, bytes_enumerated) = enumeration?;
        let AggregateOutcome { groups, failures } = outcome;

        let hash_failures = match self.config.on_hash_error {
            HashErrorPolicy::Abort => {
                if let Some(first) = failures.into_iter().next() {
                    return Err(FinderError::Hash(first));
                }
                Vec::new()
            }
            HashErrorPolicy::Report => {
                for failure in &failures {
                    log::warn!("Excluded from grouping: {}", failure);
                }
                failures
            }
        };

        let summary = ScanSummary {
            files_enumerated,
            bytes_enumerated,
            files_hashed: groups.path_count(),
            groups: groups.len(),
            duplicate_groups: groups.duplicate_groups().count(),
            duplicate_files: groups.duplicate_count(),
            hash_failures,
            workers,
            enumeration_time,
            fingerprinting_time,
        };

        log::info!(
            "Fingerprinted {} of {} files: {} duplicate groups, {} redundant files",
            summary.files_hashed,
            summary.files_enumerated,
            summary.duplicate_groups,
            summary.duplicate_files
        );

        Ok(ScanOutcome {
            root: root.to_path_buf(),
            groups,
            summary,
        })
    }

    /// Drive enumerated entries into the path stream.
    ///
    /// Consumes the sender so the stream closes on every return path.
    /// Returns the number of files and bytes produced.
    fn enumerate<I>(
        &self,
        entries: I,
        paths: Sender<FileEntry>,
        abort: &AtomicBool,
    ) -> Result<(usize, u64), ScanError>
    where
        I: IntoIterator<Item = Result<FileEntry, ScanError>>,
    {
        let mut count = 0usize;
        let mut bytes = 0u64;

        for result in entries {
            if abort.load(Ordering::SeqCst) {
                log::debug!("Enumeration stopped: workers aborted");
                break;
            }

            let file = result?;
            self.config.observer.on_file_discovered(&file);
            count += 1;
            bytes += file.size;

            if paths.send(file).is_err() {
                log::debug!("Path stream has no consumers, stopping enumeration");
                break;
            }
        }

        log::debug!("Enumeration produced {} files", count);
        Ok((count, bytes))
    }

    /// Scan `root`, then remove every duplicate but the first of each group.
    ///
    /// Elimination only starts after a complete, error-free scan.
    ///
    /// # Errors
    ///
    /// Any error from [`find_duplicates`](Self::find_duplicates). Deletion
    /// failures are not errors; they are reported in
    /// [`RunReport::deletions`].
    pub fn run(
        &self,
        root: &Path,
        delete_config: &DeleteConfig,
    ) -> Result<RunReport, FinderError> {
        let start = Instant::now();
        let outcome = self.find_duplicates(root)?;
        Ok(self.eliminate(outcome, delete_config, start))
    }

    /// Remove duplicates from a completed scan that started at `start`.
    fn eliminate(
        &self,
        outcome: ScanOutcome,
        delete_config: &DeleteConfig,
        start: Instant,
    ) -> RunReport {
        let ScanOutcome {
            root,
            groups,
            summary,
        } = outcome;

        self.enter(PipelineState::Eliminating);
        let elimination_start = Instant::now();
        let observer = self.config.observer.as_ref();
        let deletions = eliminate_duplicates(&groups, delete_config, observer);
        let elimination = elimination_start.elapsed();
        self.config
            .observer
            .on_phase_end(Phase::Elimination, elimination);
        self.enter(PipelineState::Done);

        let timing = PhaseTiming {
            enumeration: summary.enumeration_time,
            fingerprinting: summary.fingerprinting_time,
            elimination,
            total: start.elapsed(),
        };

        RunReport {
            root,
            groups,
            summary,
            deletions,
            timing,
        }
    }
}
