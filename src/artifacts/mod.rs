// Artifact schema and persistence
//
// The five files of one artifact set live here: the `meta.json` schema (the
// completion marker), the atomic writer, the offline verifier, and the
// read-side loaders the next build uses as its cache.

pub mod verifier;
pub mod writer;

use crate::config::ConfigSnapshot;
use crate::errors::IndexWarning;
use crate::incremental::FileHashLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const META_SCHEMA_VERSION: &str = "1.0.0";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const META_FILE: &str = "meta.json";
pub const REPO_MAP_FILE: &str = "repo_map.json";
pub const SYMBOLS_FILE: &str = "symbols.jsonl";
pub const TEST_MAP_FILE: &str = "test_map.json";
pub const FILE_HASHES_FILE: &str = "file_hashes.json";

/// All five artifact file names, in write order. `meta` is last: its
/// presence is the completion marker.
pub const ARTIFACT_FILES: [&str; 5] = [
    FILE_HASHES_FILE,
    SYMBOLS_FILE,
    REPO_MAP_FILE,
    TEST_MAP_FILE,
    META_FILE,
];

/// Terminal status of a build as recorded in `meta`.
///
/// `Failed` exists in the taxonomy but is never persisted: a fatal error
/// aborts before `meta` is written, leaving the previous artifact set
/// intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Success,
    Partial,
    Failed,
}

/// Aggregate counters for one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexingStats {
    pub total_files: usize,
    pub total_code_files: usize,
    pub total_symbols: usize,
    pub total_tests: usize,
    pub total_modules: usize,
    pub files_new: usize,
    pub files_changed: usize,
    pub files_unchanged: usize,
    pub files_deleted: usize,
    /// False when the whole tree was re-indexed
    pub incremental: bool,
    pub duration_ms: u64,
}

/// The persisted `meta.json` artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub schema_version: String,
    pub tool_version: String,
    /// RFC-3339 generation timestamp
    pub generated_at: String,
    pub repo_root: String,
    pub git_commit: Option<String>,
    pub status: IndexStatus,
    pub stats: IndexingStats,
    pub config: ConfigSnapshot,
    #[serde(default)]
    pub warnings: Vec<IndexWarning>,
}

impl IndexMeta {
    /// Major component of a dotted version string.
    pub fn major_of(version: &str) -> Option<u64> {
        version.split('.').next()?.parse().ok()
    }
}

/// Load the previous `meta.json`; corrupt or missing is treated as absent.
pub fn load_previous_meta(dir: &Path) -> Option<IndexMeta> {
    let path = dir.join(META_FILE);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(meta) => Some(meta),
        Err(err) => {
            warn!("previous meta unreadable ({}), ignoring cache", err);
            None
        }
    }
}

/// Load the previous ledger; corrupt is treated as absent and triggers a
/// full re-index upstream.
pub fn load_previous_ledger(dir: &Path) -> Option<FileHashLedger> {
    let path = dir.join(FILE_HASHES_FILE);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(ledger) => Some(ledger),
        Err(err) => {
            warn!("previous ledger unreadable ({}), forcing full re-index", err);
            None
        }
    }
}

/// The minimum a cached symbol line must reveal to be reusable.
#[derive(Debug, Deserialize)]
struct SymbolLineHead {
    symbol_id: String,
    file: String,
}

/// One reusable record from the previous symbol stream: the raw line is
/// kept verbatim so unchanged files re-serialize byte-for-byte.
#[derive(Debug, Clone)]
pub struct CachedSymbolLine {
    pub symbol_id: String,
    pub raw: String,
}

/// Load the previous symbol stream grouped by file. A single bad line
/// drops the whole cache rather than risking a half-reused stream.
pub fn load_previous_symbols(dir: &Path) -> Option<HashMap<String, Vec<CachedSymbolLine>>> {
    let path = dir.join(SYMBOLS_FILE);
    let content = fs::read_to_string(&path).ok()?;

    let mut by_file: HashMap<String, Vec<CachedSymbolLine>> = HashMap::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let head: SymbolLineHead = match serde_json::from_str(line) {
            Ok(head) => head,
            Err(err) => {
                warn!("previous symbol stream unreadable ({}), ignoring cache", err);
                return None;
            }
        };
        by_file.entry(head.file).or_default().push(CachedSymbolLine {
            symbol_id: head.symbol_id,
            raw: line.to_string(),
        });
    }
    debug!("loaded cached symbols for {} files", by_file.len());
    Some(by_file)
}
