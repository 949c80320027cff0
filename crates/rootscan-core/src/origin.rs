//! Structural identity of the content an iterator contributes.
//!
//! Two origins are the same iff their contents are the same. Nothing here
//! compares by address, so origins built independently from equal inputs
//! collide in any hash-based set.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Reference to the workspace entity owning some roots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity kind, e.g. `module`, `library`, or a custom kind.
    pub kind: CompactString,
    /// Key unique within the kind.
    pub key: CompactString,
}

impl EntityRef {
    pub const MODULE: &'static str = "module";
    pub const LIBRARY: &'static str = "library";
    pub const SDK: &'static str = "sdk";

    /// Create a reference to an entity of an arbitrary kind.
    pub fn new(kind: impl Into<CompactString>, key: impl Into<CompactString>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
        }
    }

    pub fn module(name: impl Into<CompactString>) -> Self {
        Self::new(Self::MODULE, name)
    }

    pub fn library(name: impl Into<CompactString>) -> Self {
        Self::new(Self::LIBRARY, name)
    }

    pub fn sdk(name: impl Into<CompactString>) -> Self {
        Self::new(Self::SDK, name)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.key)
    }
}

/// Sorted set of root paths.
///
/// Declaration order never affects identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootSet(BTreeSet<PathBuf>);

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root. Returns `false` if it was already present.
    pub fn insert(&mut self, root: impl Into<PathBuf>) -> bool {
        self.0.insert(root.into())
    }

    pub fn contains(&self, root: &Path) -> bool {
        self.0.contains(root)
    }

    /// Whether `path` equals or lies below one of the roots.
    pub fn covers(&self, path: &Path) -> bool {
        self.0.iter().any(|root| path.starts_with(root))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for RootSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a RootSet {
    type Item = &'a PathBuf;
    type IntoIter = std::collections::btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Content roots of a workspace module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRootsOrigin {
    pub module: CompactString,
    pub roots: RootSet,
    /// Directories under `roots` that are not part of the module content.
    #[serde(default)]
    pub excluded: RootSet,
}

/// Roots of a library. Modules sharing a library share this origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryOrigin {
    pub library: CompactString,
    pub roots: RootSet,
}

/// Roots of an SDK.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SdkOrigin {
    pub sdk: CompactString,
    pub roots: RootSet,
}

/// Roots contributed by an arbitrary content entity.
///
/// Implementations walking generic entities must put enough data in here
/// to stay distinguishable: equal values are scanned once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericContentEntityOrigin {
    pub entity: EntityRef,
    pub roots: RootSet,
}

impl GenericContentEntityOrigin {
    pub fn new(entity: EntityRef, roots: RootSet) -> Self {
        Self { entity, roots }
    }
}

/// Identity of what an indexable files iterator contributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    ModuleRoots(ModuleRootsOrigin),
    Library(LibraryOrigin),
    Sdk(SdkOrigin),
    GenericContentEntity(GenericContentEntityOrigin),
}

impl Origin {
    /// Roots this origin declares.
    pub fn roots(&self) -> &RootSet {
        match self {
            Self::ModuleRoots(o) => &o.roots,
            Self::Library(o) => &o.roots,
            Self::Sdk(o) => &o.roots,
            Self::GenericContentEntity(o) => &o.roots,
        }
    }

    /// Entity owning the roots.
    pub fn entity(&self) -> EntityRef {
        match self {
            Self::ModuleRoots(o) => EntityRef::module(o.module.clone()),
            Self::Library(o) => EntityRef::library(o.library.clone()),
            Self::Sdk(o) => EntityRef::sdk(o.sdk.clone()),
            Self::GenericContentEntity(o) => o.entity.clone(),
        }
    }
}

impl From<ModuleRootsOrigin> for Origin {
    fn from(origin: ModuleRootsOrigin) -> Self {
        Self::ModuleRoots(origin)
    }
}

impl From<LibraryOrigin> for Origin {
    fn from(origin: LibraryOrigin) -> Self {
        Self::Library(origin)
    }
}

impl From<SdkOrigin> for Origin {
    fn from(origin: SdkOrigin) -> Self {
        Self::Sdk(origin)
    }
}

impl From<GenericContentEntityOrigin> for Origin {
    fn from(origin: GenericContentEntityOrigin) -> Self {
        Self::GenericContentEntity(origin)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots = self.roots().len();
        let plural = if roots == 1 { "" } else { "s" };
        write!(f, "{} ({roots} root{plural})", self.entity())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn library(name: &str, roots: &[&str]) -> Origin {
        LibraryOrigin {
            library: name.into(),
            roots: roots.iter().copied().collect(),
        }
        .into()
    }

    #[test]
    fn test_independent_origins_are_equal() {
        let a = library("guava", &["/libs/guava.jar", "/libs/guava-sources.jar"]);
        let b = library("guava", &["/libs/guava-sources.jar", "/libs/guava.jar"]);

        assert_eq!(a, b);

        let mut seen = HashSet::new();
        assert!(seen.insert(a));
        assert!(!seen.insert(b));
    }

    #[test]
    fn test_different_roots_are_distinct() {
        let a = library("guava", &["/libs/guava-31.jar"]);
        let b = library("guava", &["/libs/guava-32.jar"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_roots_different_kinds_are_distinct() {
        let roots: RootSet = ["/shared"].into_iter().collect();
        let lib = Origin::from(LibraryOrigin {
            library: "shared".into(),
            roots: roots.clone(),
        });
        let sdk = Origin::from(SdkOrigin {
            sdk: "shared".into(),
            roots,
        });
        assert_ne!(lib, sdk);
    }

    #[test]
    fn test_root_set_covers() {
        let roots: RootSet = ["/work/app/src"].into_iter().collect();
        assert!(roots.covers(Path::new("/work/app/src")));
        assert!(roots.covers(Path::new("/work/app/src/main.rs")));
        assert!(!roots.covers(Path::new("/work/app/srcgen/lib.rs")));
    }

    #[test]
    fn test_display() {
        let origin = library("guava", &["/libs/guava.jar"]);
        assert_eq!(origin.to_string(), "library 'guava' (1 root)");
    }
}
