//! The contract every indexable files iterator implements.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::IndexingContext;
use crate::error::IndexingError;
use crate::messages::MessageCatalog;
use crate::origin::Origin;
use crate::visitor::{ContentVisitor, RootFilter};

/// How a walk ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkOutcome {
    /// Every matched entry was visited.
    Completed,
    /// The visitor asked to stop.
    Stopped,
    /// The context was cancelled between two entries.
    Cancelled,
}

impl WalkOutcome {
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

/// Something that can walk a set of files and say what it contributes.
///
/// Iterators are deduplicated by [`origin`](Self::origin): of several
/// iterators with equal origins, only the first one ever walks.
pub trait IndexableFilesIterator: Send + Sync {
    /// Identity of the contributed content.
    ///
    /// Must be deterministic and free of side effects; it is called more
    /// than once per pass.
    fn origin(&self) -> Result<Origin, IndexingError>;

    /// Non-localized label for logs.
    fn debug_name(&self) -> String;

    /// Label shown while this iterator's files are indexed.
    fn indexing_progress_text(&self, catalog: &MessageCatalog) -> String;

    /// Label shown while this iterator's roots are scanned.
    fn roots_scanning_progress_text(&self, catalog: &MessageCatalog) -> String;

    /// Walk every file under the roots, passing those accepted by `filter`
    /// to `visitor`.
    fn iterate_files(
        &self,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError>;
}

/// Shared handle to a candidate iterator.
pub type SharedIterator = Arc<dyn IndexableFilesIterator>;
