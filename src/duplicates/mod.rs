//! Duplicate detection module.
//!
//! This module provides the concurrent detection pipeline:
//! - Worker pool fingerprinting enumerated files
//! - Single-consumer aggregation into fingerprint groups
//! - Coordination of the whole run, including shutdown ordering

pub mod aggregator;
pub mod finder;
pub mod groups;
pub mod workers;

pub use aggregator::{AggregateOutcome, GroupAggregator};
pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, Phase, PhaseTiming, PipelineState, RunReport,
    ScanOutcome, ScanSummary, DEFAULT_QUEUE_DEPTH,
};
pub use groups::{Group, GroupMap, Pair};
pub use workers::{HashErrorPolicy, WorkerContext, WorkerMessage, WorkerPool};
