//! Fingerprint-keyed grouping of file paths.
//!
//! # Overview
//!
//! A [`Pair`] is the unit of output of one fingerprint worker. The
//! aggregator folds pairs into a [`GroupMap`], appending each path to the
//! group keyed by its fingerprint. Within a group, paths keep the order in
//! which they arrived at the aggregator, which depends on worker timing and
//! not on filesystem order.
//!
//! # Example
//!
//! ```
//! use dupesweep::duplicates::{GroupMap, Pair};
//! use dupesweep::scanner::Fingerprint;
//! use std::path::PathBuf;
//!
//! let hello = Fingerprint::of_bytes(b"hello");
//! let world = Fingerprint::of_bytes(b"world");
//!
//! let mut groups = GroupMap::new();
//! groups.insert(Pair::new(hello, PathBuf::from("/a.txt")));
//! groups.insert(Pair::new(hello, PathBuf::from("/b.txt")));
//! groups.insert(Pair::new(world, PathBuf::from("/c.txt")));
//!
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups.path_count(), 3);
//! assert_eq!(groups.duplicate_groups().count(), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::Fingerprint;

/// One (fingerprint, path) result produced by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// File that produced it
    pub path: PathBuf,
}

impl Pair {
    /// Create a new pair.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, path: PathBuf) -> Self {
        Self { fingerprint, path }
    }
}

/// Borrowed view of one group in a [`GroupMap`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Group<'a> {
    /// Fingerprint shared by every path in the group
    pub fingerprint: &'a Fingerprint,
    /// Paths in arrival order
    pub paths: &'a [PathBuf],
}

impl<'a> Group<'a> {
    /// Number of paths in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Groups are never empty once published; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether this group holds duplicates (2+ paths).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.paths.len() > 1
    }

    /// The path that survives elimination.
    #[must_use]
    pub fn keeper(&self) -> Option<&'a Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Every path after the keeper.
    #[must_use]
    pub fn redundant(&self) -> &'a [PathBuf] {
        self.paths.get(1..).unwrap_or(&[])
    }
}

/// Mapping from fingerprint to the ordered paths sharing it.
///
/// Every inserted path appears in exactly one group and groups are never
/// empty. The map is built by a single writer, so it carries no locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMap {
    groups: HashMap<Fingerprint, Vec<PathBuf>>,
    paths: usize,
}

impl GroupMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the pair's path to its fingerprint's group.
    pub fn insert(&mut self, pair: Pair) {
        self.groups
            .entry(pair.fingerprint)
            .or_default()
            .push(pair.path);
        self.paths += 1;
    }

    /// Paths recorded for a fingerprint, in arrival order.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&[PathBuf]> {
        self.groups.get(fingerprint).map(Vec::as_slice)
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no pair has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of paths across all groups.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.paths
    }

    /// All groups, ordered by fingerprint for stable reporting.
    pub fn iter(&self) -> impl Iterator<Item = Group<'_>> {
        let mut keys: Vec<&Fingerprint> = self.groups.keys().collect();
        keys.sort_unstable();
        keys.into_iter().map(move |fingerprint| Group {
            fingerprint,
            paths: &self.groups[fingerprint],
        })
    }

    /// Groups with two or more paths.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = Group<'_>> {
        self.iter().filter(Group::has_duplicates)
    }

    /// Number of paths that elimination would remove.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.groups
            .values()
            .map(|paths| paths.len().saturating_sub(1))
            .sum()
    }
}

impl Serialize for GroupMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
