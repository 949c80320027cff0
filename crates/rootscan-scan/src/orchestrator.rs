//! Drives a deduplicated working set through its walks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use rootscan_core::{
    ContentVisitor, FailurePolicy, FileEntry, IndexingContext, IndexingError, IterationConfig,
    IteratorReport, IteratorState, MessageCatalog, PassReport, ProgressPhase, RootFilter,
    SharedIterator, VisitFlow,
};

use crate::dedup::{Deduplication, WorkItem, deduplicate};
use crate::progress::IndexingProgress;
use crate::tracker::VisitedPaths;

/// Default channel buffer size for progress updates.
pub const PROGRESS_CHANNEL_SIZE: usize = 100;

/// Runs indexing passes: deduplicate, then walk each surviving iterator.
pub struct IndexingOrchestrator {
    config: IterationConfig,
    catalog: MessageCatalog,
    progress_tx: broadcast::Sender<IndexingProgress>,
}

impl IndexingOrchestrator {
    /// Create an orchestrator with the built-in message catalog.
    pub fn new(config: IterationConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Self {
            config,
            catalog: MessageCatalog::new(),
            progress_tx,
        }
    }

    /// Use a different message catalog for progress texts.
    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &IterationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Subscribe to pass progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<IndexingProgress> {
        self.progress_tx.subscribe()
    }

    /// Build the working set without walking anything.
    pub fn plan<I>(&self, context: &IndexingContext, candidates: I) -> Result<Deduplication, IndexingError>
    where
        I: IntoIterator<Item = SharedIterator>,
    {
        context.validate()?;
        self.config.validate()?;
        Ok(deduplicate(candidates))
    }

    /// Deduplicate `candidates` and walk the working set.
    pub fn run<I>(
        &self,
        context: &IndexingContext,
        candidates: I,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<PassReport, IndexingError>
    where
        I: IntoIterator<Item = SharedIterator>,
    {
        let plan = self.plan(context, candidates)?;
        self.execute(context, plan, visitor, filter)
    }

    /// Walk an already built working set.
    pub fn execute(
        &self,
        context: &IndexingContext,
        plan: Deduplication,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<PassReport, IndexingError> {
        context.validate()?;
        self.config.validate()?;

        let started_at = Utc::now();
        let start = Instant::now();
        let items = plan.working_set.items();
        let total = items.len();

        info!(
            workspace = context.workspace(),
            iterators = total,
            duplicates = plan.duplicates_dropped(),
            "Starting indexing pass"
        );
        let _ = self.progress_tx.send(IndexingProgress::PassStarted {
            workspace: context.workspace().to_string(),
            iterators: total,
            duplicates_dropped: plan.duplicates_dropped(),
            origin_failures: plan.origin_failures.len(),
        });

        // Fail-fast cancels this child token, never the caller's
        let pass_context = context.child();
        let run = PassRun {
            orchestrator: self,
            context: &pass_context,
            visitor,
            filter,
            total,
            aborted: AtomicBool::new(false),
            visited: self.config.skip_revisited_files.then(VisitedPaths::new),
        };

        let iterators: Vec<IteratorReport> = if self.config.parallel {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if self.config.threads > 0 {
                builder = builder.num_threads(self.config.threads);
            }
            let pool = builder
                .build()
                .map_err(|e| IndexingError::config(format!("cannot build worker pool: {e}")))?;
            pool.install(|| {
                items
                    .par_iter()
                    .enumerate()
                    .map(|(index, item)| run.run_one(index, item))
                    .collect()
            })
        } else {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| run.run_one(index, item))
                .collect()
        };

        let report = PassReport {
            workspace: context.workspace().to_string(),
            started_at,
            duration: start.elapsed(),
            policy: self.config.failure_policy,
            iterators,
            origin_failures: plan.origin_failures,
            duplicates_dropped: plan.dropped.len(),
        };

        let failed = report.count(IteratorState::Failed);
        info!(
            workspace = context.workspace(),
            entries = report.total_entries_visited(),
            failed,
            elapsed_ms = report.duration.as_millis() as u64,
            "Indexing pass finished"
        );
        let _ = self.progress_tx.send(IndexingProgress::PassFinished {
            entries_visited: report.total_entries_visited(),
            failed,
            elapsed: report.duration,
        });

        Ok(report)
    }

    fn progress_text(&self, item: &WorkItem) -> String {
        match self.config.phase {
            ProgressPhase::Indexing => item.iterator.indexing_progress_text(&self.catalog),
            ProgressPhase::Scanning => item.iterator.roots_scanning_progress_text(&self.catalog),
        }
    }
}

/// Shared state of one pass.
struct PassRun<'a> {
    orchestrator: &'a IndexingOrchestrator,
    context: &'a IndexingContext,
    visitor: &'a dyn ContentVisitor,
    filter: &'a dyn RootFilter,
    total: usize,
    aborted: AtomicBool,
    visited: Option<VisitedPaths>,
}

impl PassRun<'_> {
    fn run_one(&self, index: usize, item: &WorkItem) -> IteratorReport {
        let mut report = IteratorReport::pending(item.debug_name.clone(), item.origin.clone());

        if self.aborted.load(Ordering::SeqCst) {
            report.state = IteratorState::Skipped;
            return self.finish(index, report);
        }
        if self.context.is_cancelled() {
            report.state = IteratorState::Cancelled;
            return self.finish(index, report);
        }

        report.state = IteratorState::Scanning;
        let text = self.orchestrator.progress_text(item);
        debug!(iterator = %item.debug_name, origin = %item.origin, "{text}");
        let _ = self
            .orchestrator
            .progress_tx
            .send(IndexingProgress::IteratorStarted {
                index,
                total: self.total,
                debug_name: item.debug_name.clone(),
                text,
            });

        let counting = CountingVisitor {
            inner: self.visitor,
            run: self,
            index,
            entries: AtomicU64::new(0),
        };
        let start = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| {
            item.iterator
                .iterate_files(self.context, &counting, self.filter)
        }));
        report.duration = start.elapsed();
        report.entries_visited = counting.entries.load(Ordering::Relaxed);

        let failure = match result {
            Ok(Ok(outcome)) => {
                report.state = outcome.into();
                None
            }
            Ok(Err(err)) => Some(err.to_string()),
            Err(panic) => Some(panic_message(panic.as_ref())),
        };

        if let Some(message) = failure {
            warn!(iterator = %item.debug_name, error = %message, "Walk failed");
            report.state = IteratorState::Failed;
            report.error = Some(message);
            if self.orchestrator.config.failure_policy == FailurePolicy::FailFast {
                self.aborted.store(true, Ordering::SeqCst);
                self.context.cancellation().cancel();
            }
        }

        self.finish(index, report)
    }

    fn finish(&self, index: usize, report: IteratorReport) -> IteratorReport {
        let _ = self
            .orchestrator
            .progress_tx
            .send(IndexingProgress::IteratorFinished {
                index,
                debug_name: report.debug_name.clone(),
                state: report.state,
                entries_visited: report.entries_visited,
            });
        report
    }
}

/// Counts visited entries, reports progress and applies revisit tracking.
struct CountingVisitor<'a> {
    inner: &'a dyn ContentVisitor,
    run: &'a PassRun<'a>,
    index: usize,
    entries: AtomicU64,
}

impl ContentVisitor for CountingVisitor<'_> {
    fn visit(&self, entry: &FileEntry) -> VisitFlow {
        if let Some(ref visited) = self.run.visited {
            if entry.is_file() && !visited.track(&entry.path) {
                debug!(path = %entry.path.display(), "Entry already visited through another origin, skipping");
                return VisitFlow::Continue;
            }
        }

        let count = self.entries.fetch_add(1, Ordering::Relaxed) + 1;
        if count % self.run.orchestrator.config.progress_interval == 0 {
            let _ = self
                .run
                .orchestrator
                .progress_tx
                .send(IndexingProgress::EntriesVisited {
                    index: self.index,
                    entries_visited: count,
                    current_path: entry.path.clone(),
                });
        }

        self.inner.visit(entry)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("walk panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("walk panicked: {s}")
    } else {
        "walk panicked".to_string()
    }
}
