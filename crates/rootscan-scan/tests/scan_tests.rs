use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rootscan_core::{EntityRef, GenericContentEntityIterator, RootSet};
use rootscan_scan::{
    AcceptAll, ExtensionFilter, FailurePolicy, FileEntry, IndexingContext, IndexingOrchestrator,
    IterationConfig, IteratorState, RootWalker, RootsContentEntity, SharedIterator, VisitFlow,
    WorkspaceModel,
};
use tempfile::TempDir;

/// Lays out a small workspace where two modules share a library.
fn create_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("app/src/generated")).unwrap();
    fs::create_dir_all(root.join("core/src")).unwrap();
    fs::create_dir_all(root.join("libs/guava/com/google")).unwrap();
    fs::create_dir_all(root.join("docker")).unwrap();

    fs::write(root.join("app/src/main.rs"), "fn main() {}").unwrap();
    fs::write(root.join("app/src/generated/gen.rs"), "// generated").unwrap();
    fs::write(root.join("core/src/lib.rs"), "pub mod core;").unwrap();
    fs::write(root.join("core/src/notes.md"), "# notes").unwrap();
    fs::write(root.join("libs/guava/com/google/Lists.java"), "class Lists {}").unwrap();
    fs::write(root.join("libs/guava/com/google/Maps.java"), "class Maps {}").unwrap();
    fs::write(root.join("docker/compose.yml"), "services: {}").unwrap();

    fs::write(
        root.join("workspace.toml"),
        r#"
        name = "demo"

        [[module]]
        name = "app"
        roots = ["app/src"]
        excluded = ["app/src/generated"]
        libraries = ["guava"]

        [[module]]
        name = "core"
        roots = ["core/src"]
        libraries = ["guava"]

        [[library]]
        name = "guava"
        roots = ["libs/guava"]

        [[entity]]
        kind = "docker"
        key = "compose"
        roots = ["docker"]
        "#,
    )
    .unwrap();

    temp
}

/// Records every visited file.
#[derive(Default)]
struct Recorder(Mutex<Vec<PathBuf>>);

impl rootscan_scan::ContentVisitor for Recorder {
    fn visit(&self, entry: &FileEntry) -> VisitFlow {
        if entry.is_file() {
            self.0.lock().unwrap().push(entry.path.clone());
        }
        VisitFlow::Continue
    }
}

impl Recorder {
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

fn load(temp: &TempDir) -> WorkspaceModel {
    WorkspaceModel::load(&temp.path().join("workspace.toml")).unwrap()
}

#[test]
fn test_shared_library_is_walked_once() {
    let temp = create_workspace();
    let model = load(&temp);
    let config = IterationConfig::default();
    let walker = Arc::new(RootWalker::new(&config).unwrap());
    let recorder = Recorder::default();

    let report = IndexingOrchestrator::new(config)
        .run(
            &IndexingContext::new(model.name.as_str()),
            model.candidates(walker),
            &recorder,
            &AcceptAll,
        )
        .unwrap();

    let names: Vec<&str> = report
        .iterators
        .iter()
        .map(|r| r.debug_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Module 'app'",
            "Library 'guava'",
            "Module 'core'",
            "Generic content roots from entity",
        ]
    );
    assert_eq!(report.duplicates_dropped, 1);
    assert!(report.is_success());

    // Roots and directories are entries too: 6 files plus 6 directories
    assert_eq!(report.total_entries_visited(), 12);

    assert_eq!(
        recorder.names(),
        vec!["Lists.java", "Maps.java", "compose.yml", "lib.rs", "main.rs", "notes.md"]
    );
}

#[test]
fn test_filter_applies_to_every_iterator() {
    let temp = create_workspace();
    let model = load(&temp);
    let config = IterationConfig::default();
    let walker = Arc::new(RootWalker::new(&config).unwrap());
    let recorder = Recorder::default();

    IndexingOrchestrator::new(config)
        .run(
            &IndexingContext::new("demo"),
            model.candidates(walker),
            &recorder,
            &ExtensionFilter::new(["rs", "java"]),
        )
        .unwrap();

    assert_eq!(
        recorder.names(),
        vec!["Lists.java", "Maps.java", "lib.rs", "main.rs"]
    );
}

#[test]
fn test_missing_root_fails_only_its_iterator() {
    let temp = create_workspace();
    fs::remove_dir_all(temp.path().join("libs/guava")).unwrap();
    let model = load(&temp);
    let config = IterationConfig::default();
    let walker = Arc::new(RootWalker::new(&config).unwrap());
    let recorder = Recorder::default();

    let report = IndexingOrchestrator::new(config)
        .run(
            &IndexingContext::new("demo"),
            model.candidates(walker),
            &recorder,
            &AcceptAll,
        )
        .unwrap();

    let states: Vec<IteratorState> = report.iterators.iter().map(|r| r.state).collect();
    assert_eq!(
        states,
        vec![
            IteratorState::Completed,
            IteratorState::Failed,
            IteratorState::Completed,
            IteratorState::Completed,
        ]
    );
    assert!(report.is_success());
    assert_eq!(report.failed().next().unwrap().debug_name, "Library 'guava'");
    assert_eq!(recorder.names(), vec!["compose.yml", "lib.rs", "main.rs", "notes.md"]);
}

#[test]
fn test_fail_fast_aborts_pass() {
    let temp = create_workspace();
    fs::remove_dir_all(temp.path().join("libs/guava")).unwrap();
    let model = load(&temp);
    let config = IterationConfig::builder()
        .failure_policy(FailurePolicy::FailFast)
        .build()
        .unwrap();
    let walker = Arc::new(RootWalker::new(&config).unwrap());

    let report = IndexingOrchestrator::new(config)
        .run(
            &IndexingContext::new("demo"),
            model.candidates(walker),
            &Recorder::default(),
            &AcceptAll,
        )
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.count(IteratorState::Skipped), 2);
}

#[test]
fn test_parallel_pass_visits_same_files() {
    let temp = create_workspace();
    let model = load(&temp);
    let config = IterationConfig::builder()
        .parallel(true)
        .threads(2usize)
        .build()
        .unwrap();
    let walker = Arc::new(RootWalker::new(&config).unwrap());
    let recorder = Recorder::default();

    let report = IndexingOrchestrator::new(config)
        .run(
            &IndexingContext::new("demo"),
            model.candidates(walker),
            &recorder,
            &AcceptAll,
        )
        .unwrap();

    assert_eq!(report.iterators.len(), 4);
    assert_eq!(
        recorder.names(),
        vec!["Lists.java", "Maps.java", "compose.yml", "lib.rs", "main.rs", "notes.md"]
    );
}

fn generic(kind: &str, key: &str, root: &Path, walker: &Arc<RootWalker>) -> SharedIterator {
    Arc::new(GenericContentEntityIterator::new(RootsContentEntity::new(
        EntityRef::new(kind, key),
        [root.to_path_buf()].into_iter().collect::<RootSet>(),
        Arc::clone(walker),
    )))
}

#[test]
fn test_equal_generic_origins_from_different_producers_collide() {
    let temp = create_workspace();
    let walker = Arc::new(RootWalker::default());
    let docker = temp.path().join("docker");

    // Two producers describing the same entity and roots are one origin
    let candidates = vec![
        generic("docker", "compose", &docker, &walker),
        Arc::new(
            GenericContentEntityIterator::new(RootsContentEntity::new(
                EntityRef::new("docker", "compose"),
                [docker.clone()].into_iter().collect::<RootSet>(),
                Arc::clone(&walker),
            ))
            .with_debug_name("Compose files from plugin"),
        ) as SharedIterator,
    ];

    let plan = IndexingOrchestrator::new(IterationConfig::default())
        .plan(&IndexingContext::new("demo"), candidates)
        .unwrap();

    assert_eq!(plan.working_set.len(), 1);
    assert_eq!(plan.dropped[0].debug_name, "Compose files from plugin");
}

#[test]
fn test_same_roots_under_different_entity_kinds_both_walk() {
    let temp = create_workspace();
    let walker = Arc::new(RootWalker::default());
    let docker = temp.path().join("docker");
    let recorder = Recorder::default();

    let candidates = vec![
        generic("docker", "compose", &docker, &walker),
        generic("k8s", "compose", &docker, &walker),
    ];

    let report = IndexingOrchestrator::new(IterationConfig::default())
        .run(&IndexingContext::new("demo"), candidates, &recorder, &AcceptAll)
        .unwrap();

    assert_eq!(report.iterators.len(), 2);
    assert_eq!(recorder.names(), vec!["compose.yml", "compose.yml"]);
}

#[test]
fn test_skip_revisited_files_across_overlapping_roots() {
    let temp = create_workspace();
    let walker = Arc::new(RootWalker::default());
    let docker = temp.path().join("docker");
    let recorder = Recorder::default();
    let config = IterationConfig {
        skip_revisited_files: true,
        ..Default::default()
    };

    let candidates = vec![
        generic("docker", "compose", &docker, &walker),
        generic("k8s", "compose", &docker, &walker),
    ];

    let report = IndexingOrchestrator::new(config)
        .run(&IndexingContext::new("demo"), candidates, &recorder, &AcceptAll)
        .unwrap();

    assert_eq!(report.iterators.len(), 2);
    assert_eq!(recorder.names(), vec!["compose.yml"]);
}
