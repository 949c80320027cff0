//! Error types for indexing passes.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while enumerating or walking indexable content.
#[derive(Debug, Error)]
pub enum IndexingError {
    /// A candidate iterator could not produce its origin.
    #[error("Cannot compute origin of {iterator}: {message}")]
    OriginComputation { iterator: String, message: String },

    /// A file walk failed for a reason other than an I/O error.
    #[error("Walk of {iterator} failed: {message}")]
    Walk { iterator: String, message: String },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Declared root not found.
    #[error("Root not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration or caller misuse.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Workspace description is inconsistent.
    #[error("Invalid workspace: {message}")]
    InvalidWorkspace { message: String },
}

impl IndexingError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an origin computation failure.
    pub fn origin(iterator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OriginComputation {
            iterator: iterator.into(),
            message: message.into(),
        }
    }

    /// Create a walk failure.
    pub fn walk(iterator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Walk {
            iterator: iterator.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error must abort a pass before any walk starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::InvalidWorkspace { .. }
        )
    }
}
