//! Indexing pass progress reporting.

use std::path::PathBuf;
use std::time::Duration;

use rootscan_core::IteratorState;

/// Progress events broadcast while a pass runs.
#[derive(Debug, Clone)]
pub enum IndexingProgress {
    /// The working set is built and walks are about to start.
    PassStarted {
        workspace: String,
        iterators: usize,
        duplicates_dropped: usize,
        origin_failures: usize,
    },
    /// An iterator's walk is starting.
    IteratorStarted {
        index: usize,
        total: usize,
        debug_name: String,
        /// Localized progress text for the configured phase.
        text: String,
    },
    /// Periodic update from a running walk.
    EntriesVisited {
        index: usize,
        entries_visited: u64,
        current_path: PathBuf,
    },
    /// An iterator reached a terminal state.
    IteratorFinished {
        index: usize,
        debug_name: String,
        state: IteratorState,
        entries_visited: u64,
    },
    /// Every iterator reached a terminal state.
    PassFinished {
        entries_visited: u64,
        failed: usize,
        elapsed: Duration,
    },
}

impl IndexingProgress {
    /// Short human-readable line for this event.
    pub fn describe(&self) -> String {
        match self {
            Self::PassStarted {
                workspace,
                iterators,
                duplicates_dropped,
                ..
            } => format!(
                "Indexing {workspace}: {iterators} iterators ({duplicates_dropped} duplicates dropped)"
            ),
            Self::IteratorStarted {
                index, total, text, ..
            } => format!("[{}/{total}] {text}", index + 1),
            Self::EntriesVisited {
                index,
                entries_visited,
                ..
            } => format!("[{}] {entries_visited} entries", index + 1),
            Self::IteratorFinished {
                index,
                debug_name,
                state,
                entries_visited,
            } => format!("[{}] {debug_name}: {state} ({entries_visited} entries)", index + 1),
            Self::PassFinished {
                entries_visited,
                failed,
                elapsed,
            } => format!(
                "Done: {entries_visited} entries, {failed} failed in {:.2}s",
                elapsed.as_secs_f64()
            ),
        }
    }
}
