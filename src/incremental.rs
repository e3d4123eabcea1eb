// Change analysis and the content-hash ledger
//
// The ledger (`file_hashes.json`) records hash + mtime + size for every file
// that survived the previous build. Against it, each discovered file gets a
// verdict through a two-tier test: a cheap mtime+size quick-check first, a
// full content hash only when the quick-check misses. Stat drift with
// identical content stays `unchanged` and is never surfaced.

use crate::discovery::DiscoveredFile;
use crate::utils::fs as fsutil;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

pub const FILE_HASHES_SCHEMA_VERSION: &str = "1.0.0";

/// One ledger record; `mtime` is the RFC-3339 string from discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashEntry {
    pub hash: String,
    pub mtime: String,
    pub size: u64,
}

/// The persisted `file_hashes.json` artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHashLedger {
    pub schema_version: String,
    pub git_commit: Option<String>,
    pub files: BTreeMap<String, FileHashEntry>,
}

impl FileHashLedger {
    pub fn empty(git_commit: Option<String>) -> Self {
        Self {
            schema_version: FILE_HASHES_SCHEMA_VERSION.to_string(),
            git_commit,
            files: BTreeMap::new(),
        }
    }
}

/// Per-file change verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Changed,
    Unchanged,
    Deleted,
}

/// The outcome of comparing one discovery pass against the prior ledger.
#[derive(Debug, Default)]
pub struct ChangeAnalysis {
    /// Verdicts for discovered files, in discovery order
    pub verdicts: Vec<(String, ChangeKind)>,
    /// Content hash for every discovered file (computed, or inherited from
    /// the ledger when the quick-check hit)
    pub hashes: HashMap<String, String>,
    /// Prior entries with no current discovery
    pub deleted: Vec<String>,
}

impl ChangeAnalysis {
    /// Paths whose symbols must be re-extracted this build.
    pub fn paths_to_index(&self) -> HashSet<String> {
        self.verdicts
            .iter()
            .filter(|(_, kind)| matches!(kind, ChangeKind::New | ChangeKind::Changed))
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        if kind == ChangeKind::Deleted {
            return self.deleted.len();
        }
        self.verdicts.iter().filter(|(_, k)| *k == kind).count()
    }
}

/// Classify each discovered file as new / changed / unchanged and collect
/// deletions. `unchanged` guarantees identical content; `changed` means the
/// content differs or could not be read.
pub fn analyze_changes(
    files: &[DiscoveredFile],
    prior: Option<&FileHashLedger>,
) -> ChangeAnalysis {
    let mut analysis = ChangeAnalysis::default();
    let empty = BTreeMap::new();
    let prior_files = prior.map(|l| &l.files).unwrap_or(&empty);

    for file in files {
        let (kind, hash) = classify(file, prior_files.get(&file.rel_path));
        analysis.hashes.insert(file.rel_path.clone(), hash);
        analysis.verdicts.push((file.rel_path.clone(), kind));
    }

    let discovered: HashSet<&str> = files.iter().map(|f| f.rel_path.as_str()).collect();
    for path in prior_files.keys() {
        if !discovered.contains(path.as_str()) {
            analysis.deleted.push(path.clone());
        }
    }

    debug!(
        "change analysis: {} new, {} changed, {} unchanged, {} deleted",
        analysis.count(ChangeKind::New),
        analysis.count(ChangeKind::Changed),
        analysis.count(ChangeKind::Unchanged),
        analysis.deleted.len()
    );
    analysis
}

fn classify(file: &DiscoveredFile, prior: Option<&FileHashEntry>) -> (ChangeKind, String) {
    let prior = match prior {
        Some(entry) => entry,
        None => {
            let hash = hash_or_fallback(file, None);
            return (ChangeKind::New, hash);
        }
    };

    // Quick-check: both stats must match to skip rehashing.
    if prior.mtime == file.mtime_string() && prior.size == file.size {
        return (ChangeKind::Unchanged, prior.hash.clone());
    }

    match fsutil::hash_file(&file.abs_path) {
        Ok(hash) if hash == prior.hash => {
            // Stats drifted but the content did not (touch, checkout, ...).
            debug!("stat drift without content change: {}", file.rel_path);
            (ChangeKind::Unchanged, hash)
        }
        Ok(hash) => (ChangeKind::Changed, hash),
        Err(err) => {
            warn!("failed to hash {}: {}", file.rel_path, err);
            (ChangeKind::Changed, prior.hash.clone())
        }
    }
}

fn hash_or_fallback(file: &DiscoveredFile, prior_hash: Option<&str>) -> String {
    match fsutil::hash_file(&file.abs_path) {
        Ok(hash) => hash,
        Err(err) => {
            warn!("failed to hash {}: {}", file.rel_path, err);
            prior_hash
                .map(String::from)
                .unwrap_or_else(|| fsutil::hash_bytes(&[]))
        }
    }
}

/// Rebuild the ledger for the survivors of this build: fresh stats from
/// discovery, hashes from the analysis, deleted entries dropped.
pub fn build_ledger(
    files: &[DiscoveredFile],
    analysis: &ChangeAnalysis,
    git_commit: Option<String>,
) -> FileHashLedger {
    let mut ledger = FileHashLedger::empty(git_commit);
    for file in files {
        let hash = analysis
            .hashes
            .get(&file.rel_path)
            .cloned()
            .unwrap_or_else(|| fsutil::hash_bytes(&[]));
        ledger.files.insert(
            file.rel_path.clone(),
            FileHashEntry {
                hash,
                mtime: file.mtime_string(),
                size: file.size,
            },
        );
    }
    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use std::path::Path;

    fn discovered(dir: &Path, rel: &str, content: &str) -> DiscoveredFile {
        let abs = dir.join(rel);
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&abs, content).unwrap();
        let meta = fs::metadata(&abs).unwrap();
        DiscoveredFile {
            rel_path: rel.to_string(),
            abs_path: abs,
            size: meta.len(),
            mtime: chrono::DateTime::<Utc>::from(meta.modified().unwrap()),
        }
    }

    fn ledger_with(file: &DiscoveredFile, hash: &str) -> FileHashLedger {
        let mut ledger = FileHashLedger::empty(None);
        ledger.files.insert(
            file.rel_path.clone(),
            FileHashEntry {
                hash: hash.to_string(),
                mtime: file.mtime_string(),
                size: file.size,
            },
        );
        ledger
    }

    #[test]
    fn no_prior_entry_is_new() {
        let dir = tempfile::tempdir().unwrap();
        let file = discovered(dir.path(), "src/a.rs", "fn a() {}\n");
        let analysis = analyze_changes(&[file], None);
        assert_eq!(analysis.verdicts[0].1, ChangeKind::New);
        assert!(analysis.hashes["src/a.rs"].starts_with("sha256:"));
    }

    #[test]
    fn quick_check_hit_skips_rehash() {
        let dir = tempfile::tempdir().unwrap();
        let file = discovered(dir.path(), "src/a.rs", "fn a() {}\n");
        // A deliberately wrong stored hash proves the content was not re-read.
        let ledger = ledger_with(&file, "sha256:not-actually-the-hash");
        let analysis = analyze_changes(&[file], Some(&ledger));
        assert_eq!(analysis.verdicts[0].1, ChangeKind::Unchanged);
        assert_eq!(analysis.hashes["src/a.rs"], "sha256:not-actually-the-hash");
    }

    #[test]
    fn stat_drift_with_same_content_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = discovered(dir.path(), "src/a.rs", "fn a() {}\n");
        let real_hash = fsutil::hash_file(&file.abs_path).unwrap();
        let mut ledger = ledger_with(&file, &real_hash);
        // Force a quick-check miss with a drifted stored mtime.
        ledger.files.get_mut("src/a.rs").unwrap().mtime = "1999-01-01T00:00:00Z".to_string();
        let analysis = analyze_changes(&[file], Some(&ledger));
        assert_eq!(analysis.verdicts[0].1, ChangeKind::Unchanged);
    }

    #[test]
    fn content_change_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let file = discovered(dir.path(), "src/a.rs", "fn a() {}\n");
        let mut ledger = ledger_with(&file, "sha256:previous-content-hash");
        ledger.files.get_mut("src/a.rs").unwrap().size = file.size + 3;
        let analysis = analyze_changes(&[file], Some(&ledger));
        assert_eq!(analysis.verdicts[0].1, ChangeKind::Changed);
    }

    #[test]
    fn missing_files_are_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let file = discovered(dir.path(), "src/a.rs", "fn a() {}\n");
        let mut ledger = ledger_with(&file, "sha256:x");
        ledger.files.insert(
            "src/gone.rs".to_string(),
            FileHashEntry {
                hash: "sha256:y".to_string(),
                mtime: "2020-01-01T00:00:00Z".to_string(),
                size: 10,
            },
        );
        let analysis = analyze_changes(&[file], Some(&ledger));
        assert_eq!(analysis.deleted, vec!["src/gone.rs".to_string()]);
    }

    #[test]
    fn ledger_rebuild_drops_deleted_and_refreshes_stats() {
        let dir = tempfile::tempdir().unwrap();
        let file = discovered(dir.path(), "src/a.rs", "fn a() {}\n");
        let analysis = analyze_changes(&[file.clone()], None);
        let ledger = build_ledger(&[file.clone()], &analysis, Some("abc123".to_string()));
        assert_eq!(ledger.files.len(), 1);
        let entry = &ledger.files["src/a.rs"];
        assert_eq!(entry.size, file.size);
        assert_eq!(entry.mtime, file.mtime_string());
        assert_eq!(ledger.git_commit.as_deref(), Some("abc123"));
    }
}
