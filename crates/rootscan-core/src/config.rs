//! Iteration configuration types.

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::IndexingError;

/// What the orchestrator does when one iterator's walk fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and continue with the next iterator.
    #[default]
    Isolate,
    /// Abort the pass; iterators not yet started are skipped.
    FailFast,
}

/// Which progress text the orchestrator announces for each iterator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    #[default]
    Indexing,
    Scanning,
}

/// Configuration for an indexing pass.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct IterationConfig {
    /// Run distinct iterators concurrently.
    #[builder(default = "false")]
    #[serde(default)]
    pub parallel: bool,

    /// Number of worker threads (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// What a walk failure does to the rest of the pass.
    #[builder(default)]
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Progress text announced before each walk.
    #[builder(default)]
    #[serde(default)]
    pub phase: ProgressPhase,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Maximum depth below each root (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// File name globs never visited; matching directories are pruned.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Emit a progress update every this many visited entries.
    #[builder(default = "1000")]
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Skip entries already visited in this pass through another origin.
    #[builder(default = "false")]
    #[serde(default)]
    pub skip_revisited_files: bool,
}

fn default_true() -> bool {
    true
}

fn default_progress_interval() -> u64 {
    1000
}

impl IterationConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.progress_interval == Some(0) {
            return Err("Progress interval must be positive".to_string());
        }
        if let Some(ref patterns) = self.ignore_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Invalid ignore pattern {pattern:?}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl IterationConfig {
    /// Create a new config builder.
    pub fn builder() -> IterationConfigBuilder {
        IterationConfigBuilder::default()
    }

    /// Check a config that did not come through the builder.
    pub fn validate(&self) -> Result<(), IndexingError> {
        if self.progress_interval == 0 {
            return Err(IndexingError::config("progress interval must be positive"));
        }
        self.ignore_set().map(|_| ())
    }

    /// Compile the ignore patterns.
    pub fn ignore_set(&self) -> Result<GlobSet, IndexingError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore_patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                IndexingError::config(format!("invalid ignore pattern {pattern:?}: {e}"))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| IndexingError::config(format!("invalid ignore patterns: {e}")))
    }
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: 0,
            failure_policy: FailurePolicy::Isolate,
            phase: ProgressPhase::Indexing,
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            ignore_patterns: Vec::new(),
            progress_interval: 1000,
            skip_revisited_files: false,
        }
    }
}
