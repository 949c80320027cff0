//! Origin-based deduplication of candidate iterators.
//!
//! Candidates are visited in producer order. The first candidate with a
//! given origin joins the working set; later ones with an equal origin are
//! dropped before anything walks them. A candidate whose origin cannot be
//! computed is excluded and reported, without stopping the others.

use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use tracing::{debug, warn};

use rootscan_core::{IndexableFilesIterator, Origin, OriginFailure, SharedIterator};

/// A working-set member with its origin computed once.
#[derive(Clone)]
pub struct WorkItem {
    pub iterator: SharedIterator,
    pub origin: Origin,
    pub debug_name: String,
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItem")
            .field("debug_name", &self.debug_name)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// A candidate dropped in favour of an earlier one.
#[derive(Debug, Clone, Serialize)]
pub struct DroppedCandidate {
    pub debug_name: String,
    /// Working-set index of the candidate that was kept.
    pub kept: usize,
}

/// Ordered, duplicate-free sequence of iterators for one pass.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    items: Vec<WorkItem>,
}

impl WorkingSet {
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    pub fn origins(&self) -> impl Iterator<Item = &Origin> {
        self.items.iter().map(|item| &item.origin)
    }
}

/// Result of deduplicating one candidate sequence.
#[derive(Debug, Clone, Default)]
pub struct Deduplication {
    pub working_set: WorkingSet,
    pub dropped: Vec<DroppedCandidate>,
    pub origin_failures: Vec<OriginFailure>,
}

impl Deduplication {
    pub fn duplicates_dropped(&self) -> usize {
        self.dropped.len()
    }
}

/// Collapse candidates to one iterator per distinct origin, first seen wins.
pub fn deduplicate<I>(candidates: I) -> Deduplication
where
    I: IntoIterator<Item = SharedIterator>,
{
    let mut by_origin: IndexMap<Origin, WorkItem> = IndexMap::new();
    let mut dropped = Vec::new();
    let mut origin_failures = Vec::new();

    for iterator in candidates {
        let debug_name = iterator.debug_name();
        let origin = match iterator.origin() {
            Ok(origin) => origin,
            Err(err) => {
                warn!(iterator = %debug_name, error = %err, "Cannot compute origin, excluding");
                origin_failures.push(OriginFailure {
                    debug_name,
                    message: err.to_string(),
                });
                continue;
            }
        };

        match by_origin.entry(origin) {
            Entry::Occupied(kept) => {
                debug!(
                    iterator = %debug_name,
                    kept = %kept.get().debug_name,
                    origin = %kept.key(),
                    "Dropping duplicate origin"
                );
                dropped.push(DroppedCandidate {
                    debug_name,
                    kept: kept.index(),
                });
            }
            Entry::Vacant(slot) => {
                let origin = slot.key().clone();
                slot.insert(WorkItem {
                    iterator,
                    origin,
                    debug_name,
                });
            }
        }
    }

    Deduplication {
        working_set: WorkingSet {
            items: by_origin.into_values().collect(),
        },
        dropped,
        origin_failures,
    }
}

/// Convenience for callers holding concrete iterators.
pub fn share<T: IndexableFilesIterator + 'static>(iterator: T) -> SharedIterator {
    Arc::new(iterator)
}
