// File discovery
//
// Enumerates the in-scope files for one build: an ignore-aware walk of the
// repository honoring include/exclude globs, size and count caps, and the
// symlink policy. Abnormal files are skipped with a recorded reason and
// never abort the walk; only blowing the candidate cap is fatal.

use crate::config::IndexConfig;
use crate::errors::{BuildError, BuildErrorCode};
use crate::utils::paths;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Workspace-local ignore file merged into the exclude globs.
const ARK_IGNORE_FILE: &str = ".arkignore";

/// Directory names pruned from every walk regardless of user globs.
const BUILTIN_EXCLUDED_DIRS: [&str; 2] = [".git", ".ark"];

/// One file that survived discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Repo-relative path with forward slashes
    pub rel_path: String,
    pub abs_path: PathBuf,
    /// Size in bytes
    pub size: u64,
    pub mtime: DateTime<Utc>,
}

impl DiscoveredFile {
    /// The mtime string stored in the ledger. One formatter everywhere so
    /// the incremental quick-check can compare strings exactly.
    pub fn mtime_string(&self) -> String {
        format_mtime(&self.mtime)
    }
}

/// RFC-3339 UTC with microsecond precision.
pub fn format_mtime(mtime: &DateTime<Utc>) -> String {
    mtime.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A file excluded by policy, with the reason recorded for `meta.warnings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// A file the walker could not read or stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryErrorEntry {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct DiscoveryResult {
    pub files: Vec<DiscoveredFile>,
    pub skipped: Vec<SkippedFile>,
    pub errors: Vec<DiscoveryErrorEntry>,
}

/// Enumerate candidate files under `root` per the configured policy.
///
/// The walk is deterministic (entries sorted by file name at each level)
/// and the output paths are repo-relative with forward slashes.
pub fn discover_files(root: &Path, config: &IndexConfig) -> Result<DiscoveryResult, BuildError> {
    let include = compile_includes(&config.include_globs);
    let mut excludes = compile_globs(&config.exclude_globs);
    excludes.extend(load_arkignore(root));

    let mut result = DiscoveryResult::default();
    let mut candidates: usize = 0;

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .follow_links(config.follow_symlinks)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .parents(config.respect_gitignore)
        .ignore(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !BUILTIN_EXCLUDED_DIRS.contains(&name.as_ref())
        })
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("walk error: {}", err);
                result.errors.push(DiscoveryErrorEntry {
                    path: String::new(),
                    error: err.to_string(),
                });
                continue;
            }
        };

        // Directories only shape the walk; files are the candidates.
        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if is_dir {
            continue;
        }

        candidates += 1;
        if candidates > config.max_files {
            return Err(BuildError::new(
                BuildErrorCode::TooManyFiles,
                format!(
                    "repository has more than {} candidate files; raise max_files or narrow the include globs",
                    config.max_files
                ),
            ));
        }

        let abs = entry.path().to_path_buf();
        let rel = match paths::to_relative_forward(&abs, root) {
            Some(rel) if !rel.is_empty() => rel,
            _ => continue,
        };

        if entry.path_is_symlink() {
            match resolve_symlink(&abs, root, config.follow_symlinks) {
                SymlinkVerdict::Follow => {}
                SymlinkVerdict::Skip(reason) => {
                    debug!("skipping symlink {}: {}", rel, reason);
                    result.skipped.push(SkippedFile { path: rel, reason });
                    continue;
                }
            }
        }

        if let Some(ref include) = include {
            if !include.iter().any(|p| p.matches(&rel)) {
                continue;
            }
        }
        if excludes.iter().any(|p| p.matches(&rel)) {
            debug!("excluded by glob: {}", rel);
            continue;
        }

        let meta = match fs::metadata(&abs) {
            Ok(m) => m,
            Err(err) => {
                result.errors.push(DiscoveryErrorEntry {
                    path: rel,
                    error: format!("stat failed: {}", err),
                });
                continue;
            }
        };

        let size = meta.len();
        let kb = crate::utils::fs::bytes_to_kb(size);
        if kb > config.max_file_kb {
            result.skipped.push(SkippedFile {
                path: rel,
                reason: format!("file is {} KiB, over the {} KiB cap", kb, config.max_file_kb),
            });
            continue;
        }

        let mtime = match meta.modified() {
            Ok(t) => DateTime::<Utc>::from(t),
            Err(err) => {
                result.errors.push(DiscoveryErrorEntry {
                    path: rel,
                    error: format!("mtime unavailable: {}", err),
                });
                continue;
            }
        };

        result.files.push(DiscoveredFile {
            rel_path: rel,
            abs_path: abs,
            size,
            mtime,
        });
    }

    info!(
        "discovered {} files ({} skipped, {} errors)",
        result.files.len(),
        result.skipped.len(),
        result.errors.len()
    );
    Ok(result)
}

enum SymlinkVerdict {
    Follow,
    Skip(String),
}

fn resolve_symlink(abs: &Path, root: &Path, follow: bool) -> SymlinkVerdict {
    if !follow {
        return SymlinkVerdict::Skip("symlink (follow_symlinks disabled)".to_string());
    }
    let target = match abs.canonicalize() {
        Ok(t) => t,
        Err(err) => return SymlinkVerdict::Skip(format!("broken symlink: {}", err)),
    };
    let canonical_root = match root.canonicalize() {
        Ok(r) => r,
        Err(err) => return SymlinkVerdict::Skip(format!("unresolvable root: {}", err)),
    };
    if !target.starts_with(&canonical_root) {
        return SymlinkVerdict::Skip(format!(
            "symlink target {} is outside the repository",
            target.display()
        ));
    }
    SymlinkVerdict::Follow
}

/// `["**/*"]` (or nothing) means "no additional include filter"; running
/// every path through a match-all pattern is pure overhead.
fn compile_includes(globs: &[String]) -> Option<Vec<glob::Pattern>> {
    if globs.is_empty() || globs.iter().all(|g| g == "**/*") {
        return None;
    }
    Some(compile_globs(globs))
}

fn compile_globs(globs: &[String]) -> Vec<glob::Pattern> {
    globs
        .iter()
        .filter_map(|g| match glob::Pattern::new(g) {
            Ok(p) => Some(p),
            Err(err) => {
                warn!("ignoring invalid glob pattern {:?}: {}", g, err);
                None
            }
        })
        .collect()
}

/// Load `.arkignore` from the repo root: one glob per line, `#` comments.
fn load_arkignore(root: &Path) -> Vec<glob::Pattern> {
    let path = root.join(ARK_IGNORE_FILE);
    let content = match read_if_present(&path) {
        Ok(Some(c)) => c,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("failed to read {}: {}", path.display(), err);
            return Vec::new();
        }
    };

    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();
    if !lines.is_empty() {
        debug!("loaded {} patterns from {}", lines.len(), ARK_IGNORE_FILE);
    }
    compile_globs(&lines)
}

fn read_if_present(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_all_include_compiles_to_no_filter() {
        assert!(compile_includes(&["**/*".to_string()]).is_none());
        assert!(compile_includes(&[]).is_none());
        assert!(compile_includes(&["src/**".to_string()]).is_some());
    }

    #[test]
    fn invalid_globs_are_dropped_not_fatal() {
        let patterns = compile_globs(&["[".to_string(), "**/*.rs".to_string()]);
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].matches("src/lib.rs"));
    }
}
