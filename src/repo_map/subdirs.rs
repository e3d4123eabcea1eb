//! Important-subdirectory detection
//!
//! Each non-root module surfaces up to ten subdirectories, chosen from a
//! depth-limited walk by conventional names and code-file mass. More
//! specific directories are preferred over their parents, and children of a
//! very large directory face a raised bar so noise folders stay out.

use crate::language;
use crate::repo_map::key_files::{self, FileMetrics};
use crate::utils::paths;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Conventional directory names that are important regardless of size.
const IMPORTANT_NAMES: [&str; 22] = [
    "components",
    "lib",
    "hooks",
    "utils",
    "services",
    "handlers",
    "actions",
    "api",
    "store",
    "data",
    "types",
    "models",
    "views",
    "controllers",
    "middleware",
    "routes",
    "pages",
    "features",
    "modules",
    "core",
    "common",
    "shared",
];

/// Walk depth below the module root.
const MAX_DEPTH: usize = 3;

/// Code files that make an arbitrary directory important.
const CODE_IMPORTANT_THRESHOLD: usize = 3;

/// Raised bar for children of a large important parent.
const PROMOTED_CODE_THRESHOLD: usize = 6;

/// A parent this big makes its children face the raised bar (and itself a
/// scoring penalty when important children exist).
const LARGE_PARENT_THRESHOLD: usize = 20;

/// Direct code files a parent needs to survive next to a selected child.
const PARENT_KEEP_DIRECT_CODE: usize = 10;

/// Subdirectories surfaced per module.
const SUBDIR_CAP: usize = 10;

const IMPORTANT_BONUS: i64 = 50;
const DEPTH_BONUS: i64 = 10;
const LARGE_PARENT_PENALTY: i64 = 30;

/// One surfaced subdirectory of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubDirectory {
    pub name: String,
    /// Repo-root-relative path
    pub path: String,
    #[serde(rename = "fileCount")]
    pub file_count: usize,
    #[serde(rename = "codeFileCount")]
    pub code_file_count: usize,
    pub key_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default)]
struct DirStats {
    depth: usize,
    files: usize,
    code_files: usize,
    direct_code_files: usize,
}

/// Detect the important subdirectories of one non-root module.
///
/// `module_files` must already exclude subtrees owned by other modules, so
/// a sibling module's path can never surface here.
pub fn detect_subdirectories(
    module_path: &str,
    module_files: &[String],
    metrics: &HashMap<String, FileMetrics>,
) -> Vec<SubDirectory> {
    let stats = collect_dir_stats(module_path, module_files);
    if stats.is_empty() {
        return Vec::new();
    }

    let important: BTreeMap<String, bool> = stats
        .keys()
        .map(|path| (path.clone(), is_important(path, &stats)))
        .collect();

    let mut candidates: Vec<(&String, i64)> = stats
        .iter()
        .filter(|(path, _)| important[*path])
        .map(|(path, info)| {
            let mut score = info.code_files as i64 + IMPORTANT_BONUS;
            if info.depth > 1 {
                score += DEPTH_BONUS;
            }
            if info.code_files >= LARGE_PARENT_THRESHOLD
                && has_important_child(path, &stats, &important)
            {
                score -= LARGE_PARENT_PENALTY;
            }
            (path, score)
        })
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    // Prefer the specific child: a parent survives alongside a selected
    // child only on its own direct code mass.
    let keep: Vec<&String> = candidates
        .iter()
        .map(|(path, _)| *path)
        .filter(|path| {
            let child_selected = candidates
                .iter()
                .any(|(other, _)| is_descendant(other.as_str(), path.as_str()));
            !child_selected || stats[*path].direct_code_files >= PARENT_KEEP_DIRECT_CODE
        })
        .take(SUBDIR_CAP)
        .collect();

    keep.into_iter()
        .map(|path| {
            let info = &stats[path];
            SubDirectory {
                name: paths::file_name(path).to_string(),
                path: path.clone(),
                file_count: info.files,
                code_file_count: info.code_files,
                key_files: key_files::select_for_subdir(path, module_files, metrics),
                description: None,
            }
        })
        .collect()
}

fn collect_dir_stats(module_path: &str, module_files: &[String]) -> BTreeMap<String, DirStats> {
    let mut stats: BTreeMap<String, DirStats> = BTreeMap::new();
    let prefix = format!("{}/", module_path);

    for rel in module_files {
        let inside = match rel.strip_prefix(&prefix) {
            Some(rest) => rest,
            None => continue,
        };
        let segments: Vec<&str> = inside.split('/').collect();
        if segments.len() < 2 {
            continue; // file directly in the module root
        }
        let dir_segments = &segments[..segments.len() - 1];
        let is_code = language::is_code_file(rel);

        for depth in 1..=dir_segments.len().min(MAX_DEPTH) {
            let dir_path = format!("{}/{}", module_path, dir_segments[..depth].join("/"));
            let entry = stats.entry(dir_path).or_insert_with(|| DirStats {
                depth,
                ..DirStats::default()
            });
            entry.files += 1;
            if is_code {
                entry.code_files += 1;
                if depth == dir_segments.len() {
                    entry.direct_code_files += 1;
                }
            }
        }
    }

    stats
}

fn is_important(path: &str, stats: &BTreeMap<String, DirStats>) -> bool {
    let info = &stats[path];
    let name = paths::file_name(path);
    if IMPORTANT_NAMES.contains(&name) {
        return true;
    }

    // Children of a big conventional parent face a raised bar.
    let parent = paths::parent_dir(path).to_string();
    let under_large_parent = stats
        .get(&parent)
        .map(|p| {
            p.code_files >= LARGE_PARENT_THRESHOLD
                && IMPORTANT_NAMES.contains(&paths::file_name(&parent))
        })
        .unwrap_or(false);

    let threshold = if under_large_parent {
        PROMOTED_CODE_THRESHOLD
    } else {
        CODE_IMPORTANT_THRESHOLD
    };
    info.code_files >= threshold
}

fn has_important_child(
    path: &str,
    stats: &BTreeMap<String, DirStats>,
    important: &BTreeMap<String, bool>,
) -> bool {
    stats
        .keys()
        .any(|other| paths::parent_dir(other) == path && important[other])
}

fn is_descendant(child: &str, parent: &str) -> bool {
    child.len() > parent.len() && child.starts_with(parent) && child.as_bytes()[parent.len()] == b'/'
}
