//! Single-consumer aggregation of worker output.
//!
//! The aggregator is the only writer of the [`GroupMap`], so grouping needs
//! no locks; synchronization is limited to receiving from the pair stream.
//! It runs on its own thread while the workers are still hashing and
//! publishes its result exactly once, when the stream disconnects.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;

use super::groups::GroupMap;
use super::workers::WorkerMessage;
use crate::progress::PipelineObserver;
use crate::scanner::HashError;

/// Final result published by the aggregator.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    /// Completed fingerprint groups
    pub groups: GroupMap,
    /// Files the workers failed to fingerprint, in arrival order
    pub failures: Vec<HashError>,
}

/// Folds the pair stream into a [`GroupMap`].
pub struct GroupAggregator {
    outcome: AggregateOutcome,
    observer: Arc<dyn PipelineObserver>,
}

impl GroupAggregator {
    /// Create an aggregator reporting to `observer`.
    #[must_use]
    pub fn new(observer: Arc<dyn PipelineObserver>) -> Self {
        Self {
            outcome: AggregateOutcome::default(),
            observer,
        }
    }

    /// Consume messages until every sender has been dropped and the stream
    /// is drained, then return the completed outcome.
    #[must_use]
    pub fn run(mut self, pairs: Receiver<WorkerMessage>) -> AggregateOutcome {
        for message in pairs.iter() {
            self.accept(message);
        }
        log::debug!(
            "Aggregator drained: {} paths in {} groups, {} failures",
            self.outcome.groups.path_count(),
            self.outcome.groups.len(),
            self.outcome.failures.len()
        );
        self.outcome
    }

    /// Run on a dedicated thread named `aggregator`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned. In that case
    /// the receiver is dropped with the closure.
    pub fn spawn(
        self,
        pairs: Receiver<WorkerMessage>,
    ) -> std::io::Result<JoinHandle<AggregateOutcome>> {
        thread::Builder::new()
            .name("aggregator".to_string())
            .spawn(move || self.run(pairs))
    }

    fn accept(&mut self, message: WorkerMessage) {
        match message {
            Ok(pair) => {
                log::trace!("{}  {}", pair.fingerprint, pair.path.display());
                self.observer.on_file_hashed(&pair);
                self.outcome.groups.insert(pair);
            }
            Err(error) => {
                self.observer.on_hash_failed(&error);
                self.outcome.failures.push(error);
            }
        }
    }
}
