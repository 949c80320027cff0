//! Iterators over generic content entities.
//!
//! Identity and presentation are kept apart: a [`ContentEntityWalk`] supplies
//! the origin and the walk, while [`ContentEntityPresentation`] supplies the
//! debug name and progress texts. [`GenericContentEntityIterator`] combines
//! the two, so overriding texts never changes how iterators deduplicate.

use std::borrow::Cow;

use crate::context::IndexingContext;
use crate::error::IndexingError;
use crate::iterator::{IndexableFilesIterator, WalkOutcome};
use crate::messages::{MessageCatalog, keys};
use crate::origin::{GenericContentEntityOrigin, Origin};
use crate::visitor::{ContentVisitor, RootFilter};

/// Debug name of generic content iterators that do not override it.
pub const GENERIC_DEBUG_NAME: &str = "Generic content roots from entity";

/// Origin and walk of a generic content entity.
///
/// Implementors should define an origin that distinguishes their entity
/// from unrelated ones; equal origins are walked once per pass.
pub trait ContentEntityWalk: Send + Sync {
    fn origin(&self) -> Result<GenericContentEntityOrigin, IndexingError>;

    fn iterate_files(
        &self,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError>;
}

/// A progress text: a catalog key or a fixed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressText {
    Key(Cow<'static, str>),
    Literal(String),
}

impl ProgressText {
    pub fn resolve(&self, catalog: &MessageCatalog) -> String {
        match self {
            Self::Key(key) => catalog.message(key, &[]),
            Self::Literal(text) => text.clone(),
        }
    }
}

impl From<&'static str> for ProgressText {
    fn from(key: &'static str) -> Self {
        Self::Key(Cow::Borrowed(key))
    }
}

/// Debug name and progress texts of a generic content iterator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntityPresentation {
    pub debug_name: Cow<'static, str>,
    pub indexing: ProgressText,
    pub scanning: ProgressText,
}

impl Default for ContentEntityPresentation {
    fn default() -> Self {
        Self {
            debug_name: Cow::Borrowed(GENERIC_DEBUG_NAME),
            indexing: keys::INDEXING_CONTENT.into(),
            scanning: keys::SCANNING_CONTENT.into(),
        }
    }
}

/// Indexable files iterator over a generic content entity.
#[derive(Debug, Clone)]
pub struct GenericContentEntityIterator<W> {
    walk: W,
    presentation: ContentEntityPresentation,
}

impl<W: ContentEntityWalk> GenericContentEntityIterator<W> {
    /// Wrap a walk with the default generic presentation.
    pub fn new(walk: W) -> Self {
        Self {
            walk,
            presentation: ContentEntityPresentation::default(),
        }
    }

    pub fn with_debug_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.presentation.debug_name = name.into();
        self
    }

    pub fn with_indexing_text(mut self, text: ProgressText) -> Self {
        self.presentation.indexing = text;
        self
    }

    pub fn with_scanning_text(mut self, text: ProgressText) -> Self {
        self.presentation.scanning = text;
        self
    }

    pub fn walk(&self) -> &W {
        &self.walk
    }

    pub fn presentation(&self) -> &ContentEntityPresentation {
        &self.presentation
    }

    /// The origin, typed as a generic content entity origin.
    pub fn generic_origin(&self) -> Result<GenericContentEntityOrigin, IndexingError> {
        self.walk.origin()
    }
}

impl<W: ContentEntityWalk> IndexableFilesIterator for GenericContentEntityIterator<W> {
    fn origin(&self) -> Result<Origin, IndexingError> {
        self.generic_origin().map(Origin::GenericContentEntity)
    }

    fn debug_name(&self) -> String {
        self.presentation.debug_name.to_string()
    }

    fn indexing_progress_text(&self, catalog: &MessageCatalog) -> String {
        self.presentation.indexing.resolve(catalog)
    }

    fn roots_scanning_progress_text(&self, catalog: &MessageCatalog) -> String {
        self.presentation.scanning.resolve(catalog)
    }

    fn iterate_files(
        &self,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError> {
        self.walk.iterate_files(context, visitor, filter)
    }
}
