//! Iterators for the built-in entity kinds.
//!
//! Each iterator owns the origin it was created with and walks its roots
//! with a shared [`RootWalker`].

use std::sync::Arc;

use compact_str::CompactString;

use rootscan_core::messages::keys;
use rootscan_core::{
    ContentEntityWalk, ContentVisitor, EntityRef, GenericContentEntityOrigin, IndexableFilesIterator,
    IndexingContext, IndexingError, LibraryOrigin, MessageCatalog, ModuleRootsOrigin, Origin,
    RootFilter, RootSet, SdkOrigin, WalkOutcome,
};

use crate::walker::RootWalker;

/// Content roots of a module, minus its excluded directories.
#[derive(Debug, Clone)]
pub struct ModuleRootsIterator {
    origin: ModuleRootsOrigin,
    walker: Arc<RootWalker>,
}

impl ModuleRootsIterator {
    pub fn new(
        module: impl Into<CompactString>,
        roots: RootSet,
        excluded: RootSet,
        walker: Arc<RootWalker>,
    ) -> Self {
        Self {
            origin: ModuleRootsOrigin {
                module: module.into(),
                roots,
                excluded,
            },
            walker,
        }
    }
}

impl IndexableFilesIterator for ModuleRootsIterator {
    fn origin(&self) -> Result<Origin, IndexingError> {
        Ok(self.origin.clone().into())
    }

    fn debug_name(&self) -> String {
        format!("Module '{}'", self.origin.module)
    }

    fn indexing_progress_text(&self, catalog: &MessageCatalog) -> String {
        catalog.message(keys::INDEXING_MODULE, &[self.origin.module.as_str()])
    }

    fn roots_scanning_progress_text(&self, catalog: &MessageCatalog) -> String {
        catalog.message(keys::SCANNING_MODULE, &[self.origin.module.as_str()])
    }

    fn iterate_files(
        &self,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError> {
        self.walker
            .walk(&self.origin.roots, &self.origin.excluded, context, visitor, filter)
    }
}

/// Roots of a library, identified by the library alone.
#[derive(Debug, Clone)]
pub struct LibraryRootsIterator {
    origin: LibraryOrigin,
    walker: Arc<RootWalker>,
}

impl LibraryRootsIterator {
    pub fn new(library: impl Into<CompactString>, roots: RootSet, walker: Arc<RootWalker>) -> Self {
        Self {
            origin: LibraryOrigin {
                library: library.into(),
                roots,
            },
            walker,
        }
    }
}

impl IndexableFilesIterator for LibraryRootsIterator {
    fn origin(&self) -> Result<Origin, IndexingError> {
        if self.origin.roots.is_empty() {
            return Err(IndexingError::origin(
                self.debug_name(),
                "library declares no roots",
            ));
        }
        Ok(self.origin.clone().into())
    }

    fn debug_name(&self) -> String {
        format!("Library '{}'", self.origin.library)
    }

    fn indexing_progress_text(&self, catalog: &MessageCatalog) -> String {
        catalog.message(keys::INDEXING_LIBRARY, &[self.origin.library.as_str()])
    }

    fn roots_scanning_progress_text(&self, catalog: &MessageCatalog) -> String {
        catalog.message(keys::SCANNING_LIBRARY, &[self.origin.library.as_str()])
    }

    fn iterate_files(
        &self,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError> {
        self.walker
            .walk(&self.origin.roots, &RootSet::new(), context, visitor, filter)
    }
}

/// Roots of an SDK.
#[derive(Debug, Clone)]
pub struct SdkRootsIterator {
    origin: SdkOrigin,
    walker: Arc<RootWalker>,
}

impl SdkRootsIterator {
    pub fn new(sdk: impl Into<CompactString>, roots: RootSet, walker: Arc<RootWalker>) -> Self {
        Self {
            origin: SdkOrigin {
                sdk: sdk.into(),
                roots,
            },
            walker,
        }
    }
}

impl IndexableFilesIterator for SdkRootsIterator {
    fn origin(&self) -> Result<Origin, IndexingError> {
        Ok(self.origin.clone().into())
    }

    fn debug_name(&self) -> String {
        format!("SDK '{}'", self.origin.sdk)
    }

    fn indexing_progress_text(&self, catalog: &MessageCatalog) -> String {
        catalog.message(keys::INDEXING_SDK, &[self.origin.sdk.as_str()])
    }

    fn roots_scanning_progress_text(&self, catalog: &MessageCatalog) -> String {
        catalog.message(keys::SCANNING_SDK, &[self.origin.sdk.as_str()])
    }

    fn iterate_files(
        &self,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError> {
        self.walker
            .walk(&self.origin.roots, &RootSet::new(), context, visitor, filter)
    }
}

/// Walk over the roots of an arbitrary content entity.
#[derive(Debug, Clone)]
pub struct RootsContentEntity {
    origin: GenericContentEntityOrigin,
    walker: Arc<RootWalker>,
}

impl RootsContentEntity {
    pub fn new(entity: EntityRef, roots: RootSet, walker: Arc<RootWalker>) -> Self {
        Self {
            origin: GenericContentEntityOrigin::new(entity, roots),
            walker,
        }
    }
}

impl ContentEntityWalk for RootsContentEntity {
    fn origin(&self) -> Result<GenericContentEntityOrigin, IndexingError> {
        Ok(self.origin.clone())
    }

    fn iterate_files(
        &self,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError> {
        self.walker
            .walk(&self.origin.roots, &RootSet::new(), context, visitor, filter)
    }
}
