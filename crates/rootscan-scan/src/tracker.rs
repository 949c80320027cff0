//! Tracking of paths visited during a pass.

use std::path::{Path, PathBuf};

use dashmap::DashSet;

/// Tracks visited paths to detect roots overlapping across origins.
///
/// Distinct origins may still declare the same physical directory. Walks
/// can run concurrently, so the set is shared and lock-free per shard.
#[derive(Debug, Default)]
pub struct VisitedPaths {
    seen: DashSet<PathBuf>,
}

impl VisitedPaths {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Track a path. Returns `true` if this is the first time seeing it.
    pub fn track(&self, path: &Path) -> bool {
        if self.seen.contains(path) {
            return false;
        }
        self.seen.insert(path.to_path_buf())
    }

    /// Check if a path has been visited (without tracking).
    pub fn has_seen(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    /// Get the number of distinct paths tracked.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if no paths have been tracked.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
