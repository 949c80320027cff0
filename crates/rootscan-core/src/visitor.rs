//! Per-file visitor and filter contracts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Kind of entry reached by a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    /// A symbolic link the walk did not follow.
    Symlink,
}

/// An entry reached while walking a root.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Root the walk started from.
    pub root: Arc<Path>,
    pub kind: EntryKind,
    /// Depth below `root` (the root itself is 0).
    pub depth: usize,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, root: Arc<Path>, kind: EntryKind, depth: usize) -> Self {
        Self {
            path: path.into(),
            root,
            kind,
            depth,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Path relative to the walk root.
    pub fn relative_path(&self) -> &Path {
        self.path.strip_prefix(&self.root).unwrap_or(&self.path)
    }
}

/// What a visitor wants the walk to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitFlow {
    Continue,
    /// Halt the current walk. This is a normal termination.
    Stop,
}

/// Callback invoked once per matched entry.
///
/// A visitor may be shared by walks running on several threads.
pub trait ContentVisitor: Send + Sync {
    fn visit(&self, entry: &FileEntry) -> VisitFlow;
}

impl<F> ContentVisitor for F
where
    F: Fn(&FileEntry) -> VisitFlow + Send + Sync,
{
    fn visit(&self, entry: &FileEntry) -> VisitFlow {
        self(entry)
    }
}

/// Predicate deciding which entries reach the visitor.
///
/// A rejected directory is not descended into.
pub trait RootFilter: Send + Sync {
    fn accept(&self, entry: &FileEntry) -> bool;
}

impl<F> RootFilter for F
where
    F: Fn(&FileEntry) -> bool + Send + Sync,
{
    fn accept(&self, entry: &FileEntry) -> bool {
        self(entry)
    }
}

/// Filter accepting every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl RootFilter for AcceptAll {
    fn accept(&self, _entry: &FileEntry) -> bool {
        true
    }
}

/// Accepts directories and files with one of the given extensions.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

impl RootFilter for ExtensionFilter {
    fn accept(&self, entry: &FileEntry) -> bool {
        if entry.is_dir() || self.extensions.is_empty() {
            return true;
        }
        entry
            .path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}
