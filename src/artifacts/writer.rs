//! Atomic artifact writer
//!
//! Each artifact is serialized to `.{name}.tmp` in the artifact directory
//! and renamed into place; the same-directory rename is the commit point.
//! Write order is fixed with `meta` last, so a crash at any point leaves
//! either the previous complete set or the new complete set visible.

use crate::artifacts::{
    IndexMeta, FILE_HASHES_FILE, META_FILE, REPO_MAP_FILE, SYMBOLS_FILE, TEST_MAP_FILE,
};
use crate::errors::{BuildError, BuildErrorCode};
use crate::incremental::FileHashLedger;
use crate::repo_map::RepoMap;
use crate::test_map::TestMap;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything one build commits.
pub struct ArtifactSet {
    pub ledger: FileHashLedger,
    /// Pre-serialized symbol records, one JSON object per line
    pub symbol_lines: Vec<String>,
    pub repo_map: RepoMap,
    pub test_map: TestMap,
    pub meta: IndexMeta,
}

/// Write all five artifacts in order. On failure, lingering temp files are
/// removed and the previous artifact set stays untouched.
pub fn write_artifacts(dir: &Path, set: &ArtifactSet) -> Result<(), BuildError> {
    if let Err(err) = fs::create_dir_all(dir) {
        return Err(BuildError::new(
            BuildErrorCode::WriteError,
            format!("failed to create artifact directory {}: {}", dir.display(), err),
        ));
    }

    let result = write_all(dir, set);
    if result.is_err() {
        cleanup_temp_files(dir);
    }
    result
}

fn write_all(dir: &Path, set: &ArtifactSet) -> Result<(), BuildError> {
    write_json(dir, FILE_HASHES_FILE, &set.ledger)?;
    write_jsonl(dir, SYMBOLS_FILE, &set.symbol_lines)?;
    write_json(dir, REPO_MAP_FILE, &set.repo_map)?;
    write_json(dir, TEST_MAP_FILE, &set.test_map)?;
    // The completion marker goes last.
    write_json(dir, META_FILE, &set.meta)?;
    info!("committed artifact set to {}", dir.display());
    Ok(())
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<(), BuildError> {
    let body = serde_json::to_string_pretty(value).map_err(|err| {
        BuildError::new(
            BuildErrorCode::WriteError,
            format!("failed to serialize {}: {}", name, err),
        )
    })?;
    write_atomic(dir, name, body.as_bytes())
}

/// Newline-delimited records, LF-terminated when non-empty.
fn write_jsonl(dir: &Path, name: &str, lines: &[String]) -> Result<(), BuildError> {
    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    write_atomic(dir, name, body.as_bytes())
}

fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<(), BuildError> {
    let tmp = dir.join(format!(".{}.tmp", name));
    let target = dir.join(name);

    fs::write(&tmp, bytes).map_err(|err| {
        BuildError::new(
            BuildErrorCode::WriteError,
            format!("failed to write {}: {}", tmp.display(), err),
        )
    })?;
    fs::rename(&tmp, &target).map_err(|err| {
        BuildError::new(
            BuildErrorCode::WriteError,
            format!("failed to rename {} into place: {}", name, err),
        )
    })?;
    debug!("wrote {}", target.display());
    Ok(())
}

/// Remove any `.{name}.tmp` leftovers from a failed write.
pub fn cleanup_temp_files(dir: &Path) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') && name.ends_with(".tmp") {
            if let Err(err) = fs::remove_file(entry.path()) {
                warn!("failed to remove temp file {}: {}", name, err);
            } else {
                debug!("removed stale temp file {}", name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{IndexStatus, IndexingStats, META_SCHEMA_VERSION, TOOL_VERSION};
    use crate::config::ConfigSnapshot;
    use crate::repo_map::{self, overview};
    use crate::test_map::TEST_MAP_SCHEMA_VERSION;

    fn sample_set() -> ArtifactSet {
        ArtifactSet {
            ledger: FileHashLedger::empty(None),
            symbol_lines: vec![
                r#"{"symbol_id":"a.rs::f"}"#.to_string(),
                r#"{"symbol_id":"a.rs::g"}"#.to_string(),
            ],
            repo_map: repo_map::RepoMap {
                schema_version: repo_map::REPO_MAP_SCHEMA_VERSION.to_string(),
                modules: Vec::new(),
                owners: Default::default(),
                build_commands: None,
                overview: overview::build_overview(&[]),
            },
            test_map: TestMap {
                schema_version: TEST_MAP_SCHEMA_VERSION.to_string(),
                tests: Vec::new(),
            },
            meta: IndexMeta {
                schema_version: META_SCHEMA_VERSION.to_string(),
                tool_version: TOOL_VERSION.to_string(),
                generated_at: "2026-01-01T00:00:00Z".to_string(),
                repo_root: "/repo".to_string(),
                git_commit: None,
                status: IndexStatus::Success,
                stats: IndexingStats::default(),
                config: ConfigSnapshot::default(),
                warnings: Vec::new(),
            },
        }
    }

    #[test]
    fn writes_all_five_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &sample_set()).unwrap();
        for name in crate::artifacts::ARTIFACT_FILES {
            assert!(dir.path().join(name).exists(), "{} missing", name);
        }
    }

    #[test]
    fn symbol_stream_is_lf_terminated_when_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &sample_set()).unwrap();
        let body = fs::read_to_string(dir.path().join(SYMBOLS_FILE)).unwrap();
        assert!(body.ends_with('\n'));
        assert_eq!(body.lines().count(), 2);

        let mut empty = sample_set();
        empty.symbol_lines.clear();
        let dir2 = tempfile::tempdir().unwrap();
        write_artifacts(dir2.path(), &empty).unwrap();
        let body = fs::read_to_string(dir2.path().join(SYMBOLS_FILE)).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn no_temp_files_survive_a_successful_write() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &sample_set()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn cleanup_removes_stale_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".meta.json.tmp"), "partial").unwrap();
        fs::write(dir.path().join("keep.json"), "{}").unwrap();
        cleanup_temp_files(dir.path());
        assert!(!dir.path().join(".meta.json.tmp").exists());
        assert!(dir.path().join("keep.json").exists());
    }
}
