//! Per-pass results.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FailurePolicy;
use crate::iterator::WalkOutcome;
use crate::origin::Origin;

/// Lifecycle of one iterator within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IteratorState {
    Pending,
    Scanning,
    Completed,
    StoppedByVisitor,
    Failed,
    /// Cancellation was observed during or before the walk.
    Cancelled,
    /// Never started because a fail-fast pass was aborted.
    Skipped,
}

impl IteratorState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Scanning)
    }

    /// Completed and stopped-by-visitor are both normal endings.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Completed | Self::StoppedByVisitor)
    }
}

impl From<WalkOutcome> for IteratorState {
    fn from(outcome: WalkOutcome) -> Self {
        match outcome {
            WalkOutcome::Completed => Self::Completed,
            WalkOutcome::Stopped => Self::StoppedByVisitor,
            WalkOutcome::Cancelled => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for IteratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Scanning => write!(f, "scanning"),
            Self::Completed => write!(f, "completed"),
            Self::StoppedByVisitor => write!(f, "stopped by visitor"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result of one working-set iterator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IteratorReport {
    pub debug_name: String,
    pub origin: Origin,
    pub state: IteratorState,
    /// Entries handed to the visitor.
    pub entries_visited: u64,
    /// Failure message when `state` is `Failed`.
    pub error: Option<String>,
    pub duration: Duration,
}

impl IteratorReport {
    /// A report for an iterator that has not run.
    pub fn pending(debug_name: impl Into<String>, origin: Origin) -> Self {
        Self {
            debug_name: debug_name.into(),
            origin,
            state: IteratorState::Pending,
            entries_visited: 0,
            error: None,
            duration: Duration::ZERO,
        }
    }
}

/// A candidate excluded because its origin could not be computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginFailure {
    pub debug_name: String,
    pub message: String,
}

/// Outcome of a complete indexing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    pub workspace: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub policy: FailurePolicy,
    /// One entry per working-set iterator, in working-set order.
    pub iterators: Vec<IteratorReport>,
    pub origin_failures: Vec<OriginFailure>,
    /// Candidates dropped because an earlier one had an equal origin.
    pub duplicates_dropped: usize,
}

impl PassReport {
    /// Whether any iterator failed.
    pub fn has_failures(&self) -> bool {
        self.iterators.iter().any(|r| r.state == IteratorState::Failed)
    }

    /// Overall result: failures only count under a fail-fast policy.
    pub fn is_success(&self) -> bool {
        self.policy == FailurePolicy::Isolate || !self.has_failures()
    }

    pub fn failed(&self) -> impl Iterator<Item = &IteratorReport> {
        self.iterators
            .iter()
            .filter(|r| r.state == IteratorState::Failed)
    }

    pub fn count(&self, state: IteratorState) -> usize {
        self.iterators.iter().filter(|r| r.state == state).count()
    }

    pub fn total_entries_visited(&self) -> u64 {
        self.iterators.iter().map(|r| r.entries_visited).sum()
    }

    /// Get a human-readable summary of the pass.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Walked {} of {} iterators, {} entries visited",
            self.count(IteratorState::Completed) + self.count(IteratorState::StoppedByVisitor),
            self.iterators.len(),
            self.total_entries_visited()
        );
        if self.duplicates_dropped > 0 {
            summary.push_str(&format!(", {} duplicates dropped", self.duplicates_dropped));
        }
        let failed = self.count(IteratorState::Failed) + self.origin_failures.len();
        if failed > 0 {
            summary.push_str(&format!(", {failed} failed"));
        }
        let cancelled = self.count(IteratorState::Cancelled) + self.count(IteratorState::Skipped);
        if cancelled > 0 {
            summary.push_str(&format!(", {cancelled} not finished"));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::{LibraryOrigin, RootSet};

    fn report(name: &str, state: IteratorState, files: u64) -> IteratorReport {
        IteratorReport {
            state,
            entries_visited: files,
            ..IteratorReport::pending(
                name,
                LibraryOrigin {
                    library: name.into(),
                    roots: RootSet::new(),
                }
                .into(),
            )
        }
    }

    fn pass(policy: FailurePolicy, iterators: Vec<IteratorReport>) -> PassReport {
        PassReport {
            workspace: "demo".to_string(),
            started_at: Utc::now(),
            duration: Duration::from_millis(5),
            policy,
            iterators,
            origin_failures: Vec::new(),
            duplicates_dropped: 1,
        }
    }

    #[test]
    fn test_state_from_outcome() {
        assert_eq!(IteratorState::from(WalkOutcome::Completed), IteratorState::Completed);
        assert_eq!(IteratorState::from(WalkOutcome::Stopped), IteratorState::StoppedByVisitor);
        assert!(IteratorState::StoppedByVisitor.is_success());
        assert!(!IteratorState::Failed.is_success());
        assert!(IteratorState::Skipped.is_terminal());
        assert!(!IteratorState::Scanning.is_terminal());
    }

    #[test]
    fn test_success_depends_on_policy() {
        let iterators = vec![
            report("a", IteratorState::Completed, 3),
            report("b", IteratorState::Failed, 0),
        ];

        let isolated = pass(FailurePolicy::Isolate, iterators.clone());
        assert!(isolated.has_failures());
        assert!(isolated.is_success());

        let strict = pass(FailurePolicy::FailFast, iterators);
        assert!(!strict.is_success());
        assert_eq!(strict.failed().count(), 1);
    }

    #[test]
    fn test_summary() {
        let report = pass(
            FailurePolicy::Isolate,
            vec![
                report("a", IteratorState::Completed, 3),
                report("b", IteratorState::StoppedByVisitor, 2),
                report("c", IteratorState::Failed, 0),
            ],
        );
        assert_eq!(
            report.summary(),
            "Walked 2 of 3 iterators, 5 entries visited, 1 duplicates dropped, 1 failed"
        );
    }
}
