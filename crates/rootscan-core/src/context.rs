//! Workspace scope of an indexing pass.

use compact_str::CompactString;
use tokio_util::sync::CancellationToken;

use crate::error::IndexingError;

/// Identifies the workspace being indexed and carries its cancellation signal.
#[derive(Debug, Clone)]
pub struct IndexingContext {
    workspace: CompactString,
    cancel: CancellationToken,
}

impl IndexingContext {
    /// Create a context for the named workspace.
    pub fn new(workspace: impl Into<CompactString>) -> Self {
        Self {
            workspace: workspace.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Walks check this between files.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A context sharing the workspace whose token is cancelled with ours.
    pub fn child(&self) -> Self {
        Self {
            workspace: self.workspace.clone(),
            cancel: self.cancel.child_token(),
        }
    }

    /// Reject contexts that cannot scope a pass.
    pub fn validate(&self) -> Result<(), IndexingError> {
        if self.workspace.trim().is_empty() {
            return Err(IndexingError::config("workspace name cannot be empty"));
        }
        Ok(())
    }
}
