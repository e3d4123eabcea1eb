// Index configuration
//
// The effective configuration is embedded into `meta.config` on every build
// and compared against the previous snapshot on the next one. A mismatch on
// any scope-affecting knob silently forces a full re-index.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for one index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Include globs; `["**/*"]` means no additional filter
    pub include_globs: Vec<String>,

    /// Exclude globs applied on top of the built-in `.git`/`.ark` excludes
    pub exclude_globs: Vec<String>,

    /// Per-file size cap in KiB (rounded up)
    pub max_file_kb: u64,

    /// Candidate-count cap; exceeding it fails the build
    pub max_files: usize,

    /// Mirror standard gitignore semantics while walking
    pub respect_gitignore: bool,

    /// Follow symlinks (with a real-path containment check) instead of
    /// skipping them
    pub follow_symlinks: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            include_globs: vec!["**/*".to_string()],
            exclude_globs: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
                "**/__pycache__/**".to_string(),
                "**/*.min.js".to_string(),
            ],
            max_file_kb: 1024,
            max_files: 50_000,
            respect_gitignore: true,
            follow_symlinks: false,
        }
    }
}

/// The configuration snapshot persisted inside `meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSnapshot {
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub max_file_kb: u64,
    pub max_files: usize,
    pub respect_gitignore: bool,
    pub follow_symlinks: bool,
    /// Names of the symbol adapters offered to the build, in order
    #[serde(default)]
    pub adapters: Vec<String>,
    /// Names of adapters that actually pre-empted the baseline
    #[serde(default)]
    pub adapters_used: Vec<String>,
}

impl ConfigSnapshot {
    pub fn capture(config: &IndexConfig, adapter_names: &[String]) -> Self {
        Self {
            include_globs: config.include_globs.clone(),
            exclude_globs: config.exclude_globs.clone(),
            max_file_kb: config.max_file_kb,
            max_files: config.max_files,
            respect_gitignore: config.respect_gitignore,
            follow_symlinks: config.follow_symlinks,
            adapters: adapter_names.to_vec(),
            adapters_used: Vec::new(),
        }
    }

    /// Scope-equivalence against a previous snapshot. Globs and adapter
    /// names compare set-wise; `max_files` and `follow_symlinks` do not
    /// affect what a surviving file's symbols look like, so they are
    /// excluded.
    pub fn same_scope(&self, previous: &ConfigSnapshot) -> bool {
        fn as_set(items: &[String]) -> BTreeSet<&str> {
            items.iter().map(String::as_str).collect()
        }

        as_set(&self.include_globs) == as_set(&previous.include_globs)
            && as_set(&self.exclude_globs) == as_set(&previous.exclude_globs)
            && self.max_file_kb == previous.max_file_kb
            && self.respect_gitignore == previous.respect_gitignore
            && as_set(&self.adapters) == as_set(&previous.adapters)
    }
}
