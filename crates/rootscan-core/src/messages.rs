//! Catalog of user-facing progress messages.
//!
//! Messages are looked up by key. Templates use `{0}`, `{1}`... for
//! positional arguments. A missing key renders as `!key!` so gaps in a
//! translation stay visible instead of silently empty.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::IndexingError;

/// Well-known message keys.
pub mod keys {
    pub const INDEXING_CONTENT: &str = "indexable.files.provider.indexing.content";
    pub const SCANNING_CONTENT: &str = "indexable.files.provider.scanning.content";
    pub const INDEXING_MODULE: &str = "indexable.files.provider.indexing.module.name";
    pub const SCANNING_MODULE: &str = "indexable.files.provider.scanning.module.name";
    pub const INDEXING_LIBRARY: &str = "indexable.files.provider.indexing.library.name";
    pub const SCANNING_LIBRARY: &str = "indexable.files.provider.scanning.library.name";
    pub const INDEXING_SDK: &str = "indexable.files.provider.indexing.sdk";
    pub const SCANNING_SDK: &str = "indexable.files.provider.scanning.sdk";
}

const DEFAULTS: &[(&str, &str)] = &[
    (keys::INDEXING_CONTENT, "Indexing content"),
    (keys::SCANNING_CONTENT, "Scanning content"),
    (keys::INDEXING_MODULE, "Indexing module '{0}'"),
    (keys::SCANNING_MODULE, "Scanning module '{0}'"),
    (keys::INDEXING_LIBRARY, "Indexing library '{0}'"),
    (keys::SCANNING_LIBRARY, "Scanning library '{0}'"),
    (keys::INDEXING_SDK, "Indexing SDK '{0}'"),
    (keys::SCANNING_SDK, "Scanning SDK '{0}'"),
];

/// Key to template lookup table.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    /// Catalog with the built-in English messages.
    pub fn new() -> Self {
        Self {
            entries: DEFAULTS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Catalog without any entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace a template.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    /// Merge templates from the `[messages]` table of a TOML document.
    pub fn merge_toml(&mut self, source: &str) -> Result<usize, IndexingError> {
        let file: CatalogFile = toml::from_str(source)
            .map_err(|e| IndexingError::config(format!("invalid message catalog: {e}")))?;
        let count = file.messages.len();
        self.entries.extend(file.messages);
        Ok(count)
    }

    /// Merge templates from a TOML file.
    pub fn merge_file(&mut self, path: &Path) -> Result<usize, IndexingError> {
        let source = std::fs::read_to_string(path).map_err(|e| IndexingError::io(path, e))?;
        self.merge_toml(&source)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Render the message for `key` with positional arguments.
    pub fn message(&self, key: &str, args: &[&str]) -> String {
        let Some(template) = self.entries.get(key) else {
            return format!("!{key}!");
        };
        render(template, args)
    }
}

/// Substitute `{n}` placeholders in one pass over the template.
/// Unknown placeholders are kept as written.
fn render(template: &str, args: &[&str]) -> String {
    let mut text = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let digits = &after[..close];
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index: usize = digits.parse().ok()?;
            args.get(index).map(|arg| (*arg, close))
        });
        match arg {
            Some((arg, close)) => {
                text.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }
    text.push_str(rest);
    text
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}
