//! JWalk-based walking of declared roots.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use globset::GlobSet;
use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use rootscan_core::{
    ContentVisitor, EntryKind, FileEntry, IndexingContext, IndexingError, IterationConfig,
    RootFilter, RootSet, VisitFlow, WalkOutcome,
};

/// Walks root sets and feeds matched entries to a visitor.
///
/// Entries come out in depth-first order, so a rejected directory can be
/// pruned by skipping everything below it until the walk leaves it.
#[derive(Debug, Clone)]
pub struct RootWalker {
    follow_symlinks: bool,
    include_hidden: bool,
    max_depth: Option<usize>,
    ignore: GlobSet,
    parallelism: WalkParallelism,
}

#[derive(Debug, Clone, Copy)]
enum WalkParallelism {
    Serial,
    Pool(usize),
}

impl RootWalker {
    /// Create a walker from an iteration config.
    ///
    /// When iterators run concurrently each walk is serial; otherwise a walk
    /// reads directories on the rayon pool.
    pub fn new(config: &IterationConfig) -> Result<Self, IndexingError> {
        let parallelism = if config.parallel {
            WalkParallelism::Serial
        } else {
            WalkParallelism::Pool(config.threads)
        };
        Ok(Self {
            follow_symlinks: config.follow_symlinks,
            include_hidden: config.include_hidden,
            max_depth: config.max_depth,
            ignore: config.ignore_set()?,
            parallelism,
        })
    }

    /// Walk every root in `roots`, skipping anything under `excluded`.
    pub fn walk(
        &self,
        roots: &RootSet,
        excluded: &RootSet,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError> {
        for root in roots.iter() {
            if context.is_cancelled() {
                return Ok(WalkOutcome::Cancelled);
            }
            if excluded.covers(root) {
                debug!(root = %root.display(), "Root is excluded, skipping");
                continue;
            }
            let outcome = self.walk_root(root, excluded, context, visitor, filter)?;
            if !outcome.is_completed() {
                return Ok(outcome);
            }
        }
        Ok(WalkOutcome::Completed)
    }

    /// Walk a single root.
    fn walk_root(
        &self,
        root: &Path,
        excluded: &RootSet,
        context: &IndexingContext,
        visitor: &dyn ContentVisitor,
        filter: &dyn RootFilter,
    ) -> Result<WalkOutcome, IndexingError> {
        // Surface a missing root as a failure of this walk
        std::fs::symlink_metadata(root).map_err(|e| IndexingError::io(root, e))?;

        let parallelism = match self.parallelism {
            WalkParallelism::Serial => Parallelism::Serial,
            WalkParallelism::Pool(0) => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            WalkParallelism::Pool(n) => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(root)
            .parallelism(parallelism)
            .sort(true)
            .skip_hidden(!self.include_hidden)
            .follow_links(self.follow_symlinks)
            .min_depth(0)
            .max_depth(self.max_depth.unwrap_or(usize::MAX));

        let root: Arc<Path> = Arc::from(root);
        let mut pruned: Option<PathBuf> = None;

        for entry_result in walker {
            if context.is_cancelled() {
                return Ok(WalkOutcome::Cancelled);
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), error = %err, "Cannot read entry, skipping");
                    continue;
                }
            };

            let path = entry.path();
            if let Some(ref prefix) = pruned {
                if path.starts_with(prefix) {
                    continue;
                }
                pruned = None;
            }

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::File
            };
            let depth = entry.depth();

            // The root itself is never subject to name patterns
            let ignored = depth > 0 && self.ignore.is_match(entry.file_name());
            if ignored || (depth > 0 && excluded.covers(&path)) {
                if kind == EntryKind::Directory {
                    pruned = Some(path);
                }
                continue;
            }

            let file_entry = FileEntry::new(path, Arc::clone(&root), kind, depth);
            if !filter.accept(&file_entry) {
                if file_entry.is_dir() {
                    pruned = Some(file_entry.path);
                }
                continue;
            }

            if visitor.visit(&file_entry) == VisitFlow::Stop {
                return Ok(WalkOutcome::Stopped);
            }
        }

        Ok(WalkOutcome::Completed)
    }
}

impl Default for RootWalker {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            ignore: GlobSet::empty(),
            parallelism: WalkParallelism::Pool(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    use rootscan_core::AcceptAll;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("generated")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();

        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/nested/lib.rs"), "pub fn f() {}").unwrap();
        fs::write(root.join("generated/out.rs"), "// generated").unwrap();
        fs::write(root.join("target/app.bin"), "bin").unwrap();
        fs::write(root.join(".hidden"), "secret").unwrap();
        fs::write(root.join("README.md"), "readme").unwrap();

        temp
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<PathBuf>>);

    impl ContentVisitor for Collect {
        fn visit(&self, entry: &FileEntry) -> VisitFlow {
            if entry.is_file() {
                let relative = entry.relative_path().to_path_buf();
                self.0.lock().unwrap().push(relative);
            }
            VisitFlow::Continue
        }
    }

    impl Collect {
        fn files(&self) -> Vec<PathBuf> {
            let mut files = self.0.lock().unwrap().clone();
            files.sort();
            files
        }
    }

    fn roots(path: &Path) -> RootSet {
        [path.to_path_buf()].into_iter().collect()
    }

    #[test]
    fn test_walk_visits_all_files() {
        let temp = create_test_tree();
        let walker = RootWalker::default();
        let visitor = Collect::default();

        let outcome = walker
            .walk(
                &roots(temp.path()),
                &RootSet::new(),
                &IndexingContext::new("test"),
                &visitor,
                &AcceptAll,
            )
            .unwrap();

        assert_eq!(outcome, WalkOutcome::Completed);
        assert_eq!(visitor.files().len(), 6);
    }

    #[test]
    fn test_excluded_and_ignored_are_pruned() {
        let temp = create_test_tree();
        let config = IterationConfig {
            ignore_patterns: vec!["target".to_string()],
            include_hidden: false,
            ..Default::default()
        };
        let walker = RootWalker::new(&config).unwrap();
        let visitor = Collect::default();
        let excluded = roots(&temp.path().join("generated"));

        walker
            .walk(
                &roots(temp.path()),
                &excluded,
                &IndexingContext::new("test"),
                &visitor,
                &AcceptAll,
            )
            .unwrap();

        assert_eq!(
            visitor.files(),
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("src/main.rs"),
                PathBuf::from("src/nested/lib.rs"),
            ]
        );
    }

    #[test]
    fn test_rejected_directory_is_not_descended() {
        let temp = create_test_tree();
        let walker = RootWalker::default();
        let visitor = Collect::default();
        let filter = |entry: &FileEntry| !(entry.is_dir() && entry.path.ends_with("src"));

        walker
            .walk(
                &roots(temp.path()),
                &RootSet::new(),
                &IndexingContext::new("test"),
                &visitor,
                &filter,
            )
            .unwrap();

        assert!(visitor.files().iter().all(|p| !p.starts_with("src")));
        assert_eq!(visitor.files().len(), 4);
    }

    #[test]
    fn test_visitor_stop() {
        let temp = create_test_tree();
        let walker = RootWalker::default();
        let seen = Mutex::new(0usize);
        let visitor = |entry: &FileEntry| {
            if entry.is_file() {
                *seen.lock().unwrap() += 1;
                return VisitFlow::Stop;
            }
            VisitFlow::Continue
        };

        let outcome = walker
            .walk(
                &roots(temp.path()),
                &RootSet::new(),
                &IndexingContext::new("test"),
                &visitor,
                &AcceptAll,
            )
            .unwrap();

        assert_eq!(outcome, WalkOutcome::Stopped);
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unfollowed_symlink_is_not_a_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/a.rs"), "fn a() {}").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("vendor")).unwrap();

        let walker = RootWalker::default();
        let seen = Mutex::new(Vec::new());
        let visitor = |entry: &FileEntry| {
            let name = entry.relative_path().to_string_lossy().to_string();
            seen.lock().unwrap().push((name, entry.kind));
            VisitFlow::Continue
        };

        walker
            .walk(
                &roots(root),
                &RootSet::new(),
                &IndexingContext::new("test"),
                &visitor,
                &AcceptAll,
            )
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert!(seen.contains(&("vendor".to_string(), EntryKind::Symlink)));
        assert!(seen.contains(&("real/a.rs".to_string(), EntryKind::File)));
        assert!(!seen.iter().any(|(name, _)| name.starts_with("vendor/")));
    }

    #[test]
    fn test_cancellation_between_files() {
        let temp = create_test_tree();
        let walker = RootWalker::default();
        let context = IndexingContext::new("test");
        let seen = Mutex::new(0usize);
        let visitor = |entry: &FileEntry| {
            if entry.is_file() {
                let mut seen = seen.lock().unwrap();
                *seen += 1;
                if *seen == 3 {
                    context.cancellation().cancel();
                }
            }
            VisitFlow::Continue
        };

        let outcome = walker
            .walk(
                &roots(temp.path()),
                &RootSet::new(),
                &context,
                &visitor,
                &AcceptAll,
            )
            .unwrap();

        assert_eq!(outcome, WalkOutcome::Cancelled);
        assert_eq!(*seen.lock().unwrap(), 3);
    }

    #[test]
    fn test_cancelled_context() {
        let temp = create_test_tree();
        let walker = RootWalker::default();
        let visitor = Collect::default();
        let context = IndexingContext::new("test");
        context.cancellation().cancel();

        let outcome = walker
            .walk(&roots(temp.path()), &RootSet::new(), &context, &visitor, &AcceptAll)
            .unwrap();

        assert_eq!(outcome, WalkOutcome::Cancelled);
        assert!(visitor.files().is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let walker = RootWalker::default();

        let err = walker
            .walk(
                &roots(&temp.path().join("missing")),
                &RootSet::new(),
                &IndexingContext::new("test"),
                &Collect::default(),
                &AcceptAll,
            )
            .unwrap_err();

        assert!(matches!(err, IndexingError::NotFound { .. }));
    }

    #[test]
    fn test_single_file_root() {
        let temp = create_test_tree();
        let walker = RootWalker::default();
        let visitor = Collect::default();

        walker
            .walk(
                &roots(&temp.path().join("README.md")),
                &RootSet::new(),
                &IndexingContext::new("test"),
                &visitor,
                &AcceptAll,
            )
            .unwrap();

        assert_eq!(visitor.0.lock().unwrap().len(), 1);
    }
}
