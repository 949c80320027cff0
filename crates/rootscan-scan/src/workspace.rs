//! TOML description of a workspace and the candidates it produces.
//!
//! ```toml
//! name = "demo"
//!
//! [[module]]
//! name = "app"
//! roots = ["app/src"]
//! excluded = ["app/src/generated"]
//! libraries = ["guava"]
//! sdk = "jdk-21"
//!
//! [[library]]
//! name = "guava"
//! roots = ["libs/guava"]
//!
//! [[sdk]]
//! name = "jdk-21"
//! roots = ["/opt/jdk-21/src"]
//!
//! [[entity]]
//! kind = "docker"
//! key = "compose"
//! roots = ["docker"]
//!
//! [messages]
//! "indexable.files.provider.indexing.content" = "Indexing content"
//! ```
//!
//! Relative roots are resolved against the directory of the workspace file.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use rootscan_core::{
    EntityRef, GenericContentEntityIterator, IndexingError, MessageCatalog, ProgressText, RootSet,
    SharedIterator,
};

use crate::entities::{LibraryRootsIterator, ModuleRootsIterator, RootsContentEntity, SdkRootsIterator};
use crate::walker::RootWalker;

/// A module and the libraries and SDK it depends on.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub excluded: Vec<PathBuf>,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub sdk: Option<String>,
}

/// A named set of roots: a library or an SDK.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRoots {
    pub name: String,
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

/// A generic content entity with optional presentation overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitySpec {
    pub kind: String,
    pub key: String,
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub debug_name: Option<String>,
    #[serde(default)]
    pub indexing_text: Option<String>,
    #[serde(default)]
    pub scanning_text: Option<String>,
}

/// Workspace description loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceModel {
    pub name: String,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSpec>,
    #[serde(default, rename = "library")]
    pub libraries: Vec<NamedRoots>,
    #[serde(default, rename = "sdk")]
    pub sdks: Vec<NamedRoots>,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub messages: HashMap<String, String>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl WorkspaceModel {
    /// Load a workspace file.
    pub fn load(path: &Path) -> Result<Self, IndexingError> {
        let source = std::fs::read_to_string(path).map_err(|e| IndexingError::io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml_str(&source, base_dir)
    }

    /// Parse a workspace description; relative roots resolve against `base_dir`.
    pub fn from_toml_str(source: &str, base_dir: impl Into<PathBuf>) -> Result<Self, IndexingError> {
        let mut model: Self = toml::from_str(source).map_err(|e| IndexingError::InvalidWorkspace {
            message: e.to_string(),
        })?;
        model.base_dir = base_dir.into();
        model.validate()?;
        Ok(model)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Message catalog with this workspace's overrides applied.
    pub fn catalog(&self) -> MessageCatalog {
        let mut catalog = MessageCatalog::new();
        for (key, template) in &self.messages {
            catalog.insert(key.clone(), template.clone());
        }
        catalog
    }

    fn validate(&self) -> Result<(), IndexingError> {
        let invalid = |message: String| IndexingError::InvalidWorkspace { message };

        let libraries = unique_names("library", self.libraries.iter().map(|l| l.name.as_str()))?;
        let sdks = unique_names("sdk", self.sdks.iter().map(|s| s.name.as_str()))?;
        unique_names("module", self.modules.iter().map(|m| m.name.as_str()))?;

        for module in &self.modules {
            if let Some(missing) = module.libraries.iter().find(|l| !libraries.contains(l.as_str())) {
                return Err(invalid(format!(
                    "module '{}' depends on unknown library '{missing}'",
                    module.name
                )));
            }
            if let Some(sdk) = module.sdk.as_deref().filter(|s| !sdks.contains(s)) {
                return Err(invalid(format!(
                    "module '{}' uses unknown sdk '{sdk}'",
                    module.name
                )));
            }
        }
        Ok(())
    }

    fn resolve(&self, paths: &[PathBuf]) -> RootSet {
        paths.iter().map(|p| self.base_dir.join(p)).collect()
    }

    /// Produce candidate iterators in declaration order.
    ///
    /// Every module yields its own iterator followed by one per library it
    /// depends on and one for its SDK, so libraries shared by several
    /// modules appear several times. Generic entities follow the modules.
    pub fn candidates(&self, walker: Arc<RootWalker>) -> Vec<SharedIterator> {
        let libraries: HashMap<&str, &NamedRoots> =
            self.libraries.iter().map(|l| (l.name.as_str(), l)).collect();
        let sdks: HashMap<&str, &NamedRoots> = self.sdks.iter().map(|s| (s.name.as_str(), s)).collect();
        let mut referenced = HashSet::new();
        let mut candidates: Vec<SharedIterator> = Vec::new();

        for module in &self.modules {
            candidates.push(Arc::new(ModuleRootsIterator::new(
                module.name.as_str(),
                self.resolve(&module.roots),
                self.resolve(&module.excluded),
                Arc::clone(&walker),
            )));

            for name in &module.libraries {
                if let Some(library) = libraries.get(name.as_str()) {
                    referenced.insert(name.as_str());
                    candidates.push(Arc::new(LibraryRootsIterator::new(
                        library.name.as_str(),
                        self.resolve(&library.roots),
                        Arc::clone(&walker),
                    )));
                }
            }

            if let Some(sdk) = module.sdk.as_deref().and_then(|name| sdks.get(name)) {
                candidates.push(Arc::new(SdkRootsIterator::new(
                    sdk.name.as_str(),
                    self.resolve(&sdk.roots),
                    Arc::clone(&walker),
                )));
            }
        }

        for library in &self.libraries {
            if !referenced.contains(library.name.as_str()) {
                debug!(library = %library.name, "Library is not used by any module");
            }
        }

        for entity in &self.entities {
            let walk = RootsContentEntity::new(
                EntityRef::new(entity.kind.as_str(), entity.key.as_str()),
                self.resolve(&entity.roots),
                Arc::clone(&walker),
            );
            let mut iterator = GenericContentEntityIterator::new(walk);
            if let Some(ref name) = entity.debug_name {
                iterator = iterator.with_debug_name(name.clone());
            }
            if let Some(ref text) = entity.indexing_text {
                iterator = iterator.with_indexing_text(ProgressText::Literal(text.clone()));
            }
            if let Some(ref text) = entity.scanning_text {
                iterator = iterator.with_scanning_text(ProgressText::Literal(text.clone()));
            }
            candidates.push(Arc::new(iterator));
        }

        candidates
    }
}

fn unique_names<'a>(
    what: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, IndexingError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(IndexingError::InvalidWorkspace {
                message: format!("duplicate {what} '{name}'"),
            });
        }
    }
    Ok(seen)
}
