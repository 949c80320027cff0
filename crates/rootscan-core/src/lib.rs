//! Core types and traits for rootscan.
//!
//! This crate provides the contract shared by every indexable files
//! iterator, the structural [`Origin`] used to deduplicate them, the
//! generic content entity variant, and the configuration, message catalog
//! and report types used by an indexing pass.

mod config;
mod context;
mod error;
mod generic;
mod iterator;
pub mod messages;
mod origin;
mod report;
mod visitor;

pub use config::{FailurePolicy, IterationConfig, IterationConfigBuilder, ProgressPhase};
pub use context::IndexingContext;
pub use error::IndexingError;
pub use generic::{
    ContentEntityPresentation, ContentEntityWalk, GENERIC_DEBUG_NAME, GenericContentEntityIterator,
    ProgressText,
};
pub use iterator::{IndexableFilesIterator, SharedIterator, WalkOutcome};
pub use messages::MessageCatalog;
pub use origin::{
    EntityRef, GenericContentEntityOrigin, LibraryOrigin, ModuleRootsOrigin, Origin, RootSet,
    SdkOrigin,
};
pub use report::{IteratorReport, IteratorState, OriginFailure, PassReport};
pub use visitor::{
    AcceptAll, ContentVisitor, EntryKind, ExtensionFilter, FileEntry, RootFilter, VisitFlow,
};
