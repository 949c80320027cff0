//! Root walking, deduplication and orchestration engine for rootscan.
//!
//! # Overview
//!
//! `rootscan-scan` turns the candidate iterators of a workspace into a single
//! non-redundant file walk. Key features:
//!
//! - **Origin deduplication**: at most one walk per distinct origin, first
//!   seen wins
//! - **Failure isolation** with an optional fail-fast policy
//! - **Progress updates** via broadcast channels
//! - **Parallel walks** of distinct iterators on a rayon pool
//! - **Cooperative cancellation** checked between files
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use rootscan_scan::{
//!     AcceptAll, FileEntry, IndexingContext, IndexingOrchestrator, IterationConfig, RootWalker,
//!     VisitFlow, WorkspaceModel,
//! };
//!
//! let config = IterationConfig::default();
//! let model = WorkspaceModel::load(Path::new("workspace.toml")).unwrap();
//! let walker = Arc::new(RootWalker::new(&config).unwrap());
//!
//! let orchestrator = IndexingOrchestrator::new(config).with_catalog(model.catalog());
//! let visitor = |entry: &FileEntry| {
//!     println!("{}", entry.path.display());
//!     VisitFlow::Continue
//! };
//! let report = orchestrator
//!     .run(
//!         &IndexingContext::new(model.name.as_str()),
//!         model.candidates(walker),
//!         &visitor,
//!         &AcceptAll,
//!     )
//!     .unwrap();
//!
//! println!("{}", report.summary());
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use rootscan_scan::{IndexingOrchestrator, IterationConfig};
//!
//! let orchestrator = IndexingOrchestrator::new(IterationConfig::default());
//! let mut progress_rx = orchestrator.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         eprintln!("{}", progress.describe());
//!     }
//! });
//! ```

mod dedup;
mod entities;
mod orchestrator;
mod progress;
mod tracker;
mod walker;
mod workspace;

pub use dedup::{Deduplication, DroppedCandidate, WorkItem, WorkingSet, deduplicate, share};
pub use entities::{LibraryRootsIterator, ModuleRootsIterator, RootsContentEntity, SdkRootsIterator};
pub use orchestrator::{IndexingOrchestrator, PROGRESS_CHANNEL_SIZE};
pub use progress::IndexingProgress;
pub use tracker::VisitedPaths;
pub use walker::RootWalker;
pub use workspace::{EntitySpec, ModuleSpec, NamedRoots, WorkspaceModel};

// Re-export core types for convenience
pub use rootscan_core::{
    AcceptAll, ContentVisitor, EntryKind, ExtensionFilter, FailurePolicy, FileEntry,
    IndexableFilesIterator, IndexingContext, IndexingError, IterationConfig, IteratorReport,
    IteratorState, MessageCatalog, Origin, PassReport, ProgressPhase, RootFilter, SharedIterator,
    VisitFlow, WalkOutcome,
};
