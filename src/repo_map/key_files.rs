//! Key-file scoring and selection
//!
//! A file earns a key-file slot through raw size (LOC), coupling (import
//! count) or a semantic name with enough substance behind it. Selection is
//! bounded per subdirectory and per module, with round-robin distribution so
//! one huge directory cannot monopolize a module's slots.

use crate::discovery::DiscoveredFile;
use crate::language;
use crate::repo_map::subdirs::SubDirectory;
use crate::utils::paths;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// LOC counting stops here; generated monsters score no higher.
const LOC_CAP: usize = 100_000;

/// Key files per subdirectory.
const SUBDIR_KEY_FILE_CAP: usize = 3;

/// Thresholds for qualification.
const LOC_QUALIFIER: usize = 300;
const IMPORT_QUALIFIER: usize = 10;
const SEMANTIC_LOC_QUALIFIER: usize = 100;

fn semantic_name_res() -> &'static [(Regex, u32)] {
    static RES: OnceLock<Vec<(Regex, u32)>> = OnceLock::new();
    RES.get_or_init(|| {
        vec![
            (Regex::new(r"Complete\.(tsx|jsx)$").unwrap(), 300),
            (Regex::new(r"(Client|Server)\.\w+$").unwrap(), 250),
            (
                Regex::new(r"(Handler|Manager|Controller|Service)\.\w+$").unwrap(),
                200,
            ),
            (
                Regex::new(r"(Store|Context|Provider|Router|Reducer)\.\w+$").unwrap(),
                150,
            ),
            (
                Regex::new(r"^(types|utils|helpers?|constants?|config)\.\w+$").unwrap(),
                100,
            ),
            (Regex::new(r"^index\.\w+$").unwrap(), 50),
        ]
    })
}

/// Size, coupling and naming signals for one code file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMetrics {
    /// Non-blank, non-comment lines, capped
    pub loc: usize,
    pub imports: usize,
    pub boost: u32,
}

impl FileMetrics {
    pub fn qualifies(&self) -> bool {
        self.loc >= LOC_QUALIFIER
            || self.imports >= IMPORT_QUALIFIER
            || (self.boost > 0 && self.loc >= SEMANTIC_LOC_QUALIFIER)
    }

    pub fn score(&self) -> usize {
        self.loc + self.boost as usize
    }
}

/// Semantic-name boost from the basename; first matching pattern wins.
pub fn semantic_boost(rel_path: &str) -> u32 {
    let name = paths::file_name(rel_path);
    for (re, boost) in semantic_name_res() {
        if re.is_match(name) {
            return *boost;
        }
    }
    0
}

/// Read every code file once and compute its metrics.
pub fn collect_metrics(root: &Path, files: &[DiscoveredFile]) -> HashMap<String, FileMetrics> {
    let mut metrics = HashMap::new();
    for file in files {
        if !language::is_code_file(&file.rel_path) {
            continue;
        }
        let content = match fs::read_to_string(&file.abs_path) {
            Ok(c) => c,
            Err(err) => {
                debug!("metrics unavailable for {}: {}", file.rel_path, err);
                continue;
            }
        };
        metrics.insert(
            file.rel_path.clone(),
            measure(&file.rel_path, &content),
        );
    }
    metrics
}

/// Metrics for one file's content; pure, exposed for tests.
pub fn measure(rel_path: &str, content: &str) -> FileMetrics {
    let lang = language::language_of(rel_path);
    let comment_prefixes: &[&str] = match lang {
        "python" => &["#"],
        _ => &["//", "/*", "*"],
    };

    let mut loc = 0usize;
    let mut imports = 0usize;
    let mut in_go_import_block = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if comment_prefixes.iter().any(|p| trimmed.starts_with(p)) {
            continue;
        }
        if loc < LOC_CAP {
            loc += 1;
        }

        match lang {
            "typescript" | "javascript" => {
                if trimmed.starts_with("import ")
                    || (trimmed.starts_with("export ") && trimmed.contains(" from "))
                    || trimmed.contains("require(")
                {
                    imports += 1;
                }
            }
            "python" => {
                if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
                    imports += 1;
                }
            }
            "rust" => {
                if trimmed.starts_with("use ") || trimmed.starts_with("extern crate ") {
                    imports += 1;
                }
            }
            "go" => {
                if trimmed == "import (" {
                    in_go_import_block = true;
                } else if in_go_import_block {
                    if trimmed == ")" {
                        in_go_import_block = false;
                    } else {
                        imports += 1;
                    }
                } else if trimmed.starts_with("import ") {
                    imports += 1;
                }
            }
            _ => {
                if trimmed.starts_with("#include")
                    || trimmed.starts_with("import ")
                    || trimmed.starts_with("using ")
                {
                    imports += 1;
                }
            }
        }
    }

    FileMetrics {
        loc,
        imports,
        boost: semantic_boost(rel_path),
    }
}

/// Qualifying files in a set, highest score first, path as tiebreak.
fn ranked_qualifiers<'a>(
    candidates: impl Iterator<Item = &'a String>,
    metrics: &HashMap<String, FileMetrics>,
) -> Vec<(&'a String, FileMetrics)> {
    let mut ranked: Vec<(&String, FileMetrics)> = candidates
        .filter_map(|rel| metrics.get(rel).map(|m| (rel, *m)))
        .filter(|(_, m)| m.qualifies())
        .collect();
    ranked.sort_by(|a, b| b.1.score().cmp(&a.1.score()).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// Up to three key files for one subdirectory. If any qualifier carries a
/// semantic boost, the top-boosted one is guaranteed a slot.
pub fn select_for_subdir(
    subdir_path: &str,
    module_files: &[String],
    metrics: &HashMap<String, FileMetrics>,
) -> Vec<String> {
    let ranked = ranked_qualifiers(
        module_files
            .iter()
            .filter(|rel| crate::repo_map::modules::in_dir(rel.as_str(), subdir_path)),
        metrics,
    );

    let mut selected: Vec<String> = ranked
        .iter()
        .take(SUBDIR_KEY_FILE_CAP)
        .map(|(rel, _)| (*rel).clone())
        .collect();

    let max_boost = ranked.iter().map(|(_, m)| m.boost).max().unwrap_or(0);
    let top_boosted = if max_boost > 0 {
        // First hit is the highest-scored file at that boost level.
        ranked.iter().find(|(_, m)| m.boost == max_boost)
    } else {
        None
    };
    if let Some((rel, _)) = top_boosted {
        if !selected.iter().any(|s| s == *rel) {
            if selected.len() == SUBDIR_KEY_FILE_CAP {
                selected.pop();
            }
            selected.push((*rel).clone());
        }
    }

    selected
}

/// Up to fifteen key files for a module: round-robin over its
/// subdirectories (rank-0 from each, then rank-1, ...), topped up with the
/// best remaining qualifiers from the whole module. The root module draws
/// from files directly in the root only.
pub fn select_for_module(
    module_path: &str,
    module_files: &[String],
    subdirectories: &[SubDirectory],
    metrics: &HashMap<String, FileMetrics>,
) -> Vec<String> {
    let cap = super::MODULE_KEY_FILE_CAP;
    let mut selected: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    if module_path == "." {
        let direct: Vec<&String> = module_files
            .iter()
            .filter(|rel| paths::parent_dir(rel).is_empty())
            .collect();
        return ranked_qualifiers(direct.into_iter(), metrics)
            .into_iter()
            .take(cap)
            .map(|(rel, _)| rel.clone())
            .collect();
    }

    // Round-robin across subdirectories by rank.
    let mut rank = 0usize;
    loop {
        let mut placed_any = false;
        for sub in subdirectories {
            if selected.len() >= cap {
                break;
            }
            if let Some(rel) = sub.key_files.get(rank) {
                if seen.insert(rel.as_str()) {
                    selected.push(rel.clone());
                    placed_any = true;
                }
            }
        }
        if !placed_any || selected.len() >= cap {
            break;
        }
        rank += 1;
    }

    // Top-up with the best remaining qualifiers module-wide.
    if selected.len() < cap {
        for (rel, _) in ranked_qualifiers(module_files.iter(), metrics) {
            if selected.len() >= cap {
                break;
            }
            if seen.insert(rel.as_str()) {
                selected.push(rel.clone());
            }
        }
    }

    selected
}
