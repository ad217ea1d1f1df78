//! Fixed-size pool of stateless fingerprint workers.
//!
//! # Overview
//!
//! Each worker pulls one [`FileEntry`] at a time from the shared path
//! stream, fingerprints it, and pushes the result onto the pair stream.
//! Workers coordinate only through those two streams.
//!
//! # Shutdown
//!
//! - A worker stops when the path stream is closed and drained.
//! - Each worker owns its own clone of the pair sender. The pair stream
//!   therefore disconnects only after the last worker has exited; no caller
//!   can close it early.
//! - [`WorkerPool::start`] returns a [`WaitGroup`] that resolves once every
//!   worker has finished. This is the completion barrier the coordinator
//!   waits on before collecting the aggregator's result.
//!
//! # Failure policy
//!
//! See [`HashErrorPolicy`]. Under `Abort`, the first failure raises a shared
//! flag so the remaining workers stop pulling new paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender};
use crossbeam::sync::WaitGroup;
use serde::{Deserialize, Serialize};

use super::groups::Pair;
use crate::scanner::{FileEntry, HashError, Hasher};

/// Message carried on the pair stream.
pub type WorkerMessage = Result<Pair, HashError>;

/// What a worker does when a file cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashErrorPolicy {
    /// Stop the whole run; nothing is deleted.
    #[default]
    Abort,
    /// Report the file, exclude it from every group, and keep going.
    Report,
}

/// Shared, read-only state handed to every worker.
#[derive(Clone)]
pub struct WorkerContext {
    /// Fingerprint function
    pub hasher: Arc<Hasher>,
    /// Raised on the first failure under [`HashErrorPolicy::Abort`]
    pub abort: Arc<AtomicBool>,
    /// Failure policy
    pub policy: HashErrorPolicy,
}

impl WorkerContext {
    fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
}

/// Dedicated thread pool sized to the requested worker count.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    size: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .finish()
    }
}

impl WorkerPool {
    /// Build a pool of `size` threads (at least one).
    ///
    /// # Errors
    ///
    /// Returns the rayon build error if the threads cannot be created.
    pub fn new(size: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let size = size.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("fingerprint-{i}"))
            .build()?;
        Ok(Self { pool, size })
    }

    /// Number of workers.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Start one worker per pool thread.
    ///
    /// Takes ownership of both stream ends; the originals are dropped on
    /// return so only the workers hold them.
    pub fn start(
        &self,
        paths: Receiver<FileEntry>,
        pairs: Sender<WorkerMessage>,
        context: &WorkerContext,
    ) -> WaitGroup {
        let done = WaitGroup::new();

        for id in 0..self.size {
            let paths = paths.clone();
            let pairs = pairs.clone();
            let context = context.clone();
            let done = done.clone();
            self.pool.spawn(move || {
                let processed = fingerprint_worker(&paths, &pairs, &context);
                log::debug!("Worker {} finished after {} files", id, processed);
                drop(pairs);
                drop(done);
            });
        }

        done
    }
}

/// Worker loop. Returns the number of files this worker handled.
fn fingerprint_worker(
    paths: &Receiver<FileEntry>,
    pairs: &Sender<WorkerMessage>,
    context: &WorkerContext,
) -> usize {
    let mut processed = 0;

    for entry in paths.iter() {
        if context.is_aborted() {
            break;
        }
        processed += 1;

        let message = match context.hasher.full_hash(&entry.path) {
            Ok(fingerprint) => Ok(Pair::new(fingerprint, entry.path)),
            Err(error) => {
                if context.policy == HashErrorPolicy::Abort {
                    log::error!("Fingerprinting failed: {}", error);
                    context.abort.store(true, Ordering::SeqCst);
                } else {
                    log::warn!("Fingerprinting failed: {}", error);
                }
                Err(error)
            }
        };

        let failed = message.is_err();
        if pairs.send(message).is_err() {
            log::debug!("Pair stream closed, worker exiting");
            break;
        }
        if failed && context.is_aborted() {
            break;
        }
    }

    processed
}
