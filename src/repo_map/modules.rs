//! Module inference
//!
//! A directory is a module when it holds a package manifest. Without a root
//! manifest, top-level directories holding code become modules too. The
//! repository root is always the `"."` module.

use crate::extractors::base;
use crate::language;
use crate::utils::paths;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Package manifests that root a module.
const MANIFEST_NAMES: [&str; 5] = [
    "package.json",
    "Cargo.toml",
    "go.mod",
    "pyproject.toml",
    "setup.py",
];

/// Module description length cap.
const DESCRIPTION_MAX_CHARS: usize = 200;

pub fn is_manifest(file_name: &str) -> bool {
    MANIFEST_NAMES.contains(&file_name)
}

/// Infer module paths from the discovered file list, sorted, root first.
pub fn infer_module_paths(rels: &[String]) -> Vec<String> {
    let mut manifest_dirs: BTreeSet<String> = BTreeSet::new();
    for rel in rels {
        if is_manifest(paths::file_name(rel)) {
            let dir = paths::parent_dir(rel);
            manifest_dirs.insert(if dir.is_empty() { ".".to_string() } else { dir.to_string() });
        }
    }

    let root_manifest = manifest_dirs.contains(".");
    let mut modules: BTreeSet<String> = manifest_dirs.clone();
    modules.insert(".".to_string());

    if !root_manifest {
        // Top-level directories holding code become modules, unless a
        // manifest-rooted module already covers them.
        for rel in rels {
            if !language::is_code_file(rel) {
                continue;
            }
            let top = match rel.split('/').next() {
                Some(top) if rel.contains('/') => top.to_string(),
                _ => continue,
            };
            let covered = manifest_dirs.iter().any(|m| {
                m == &top || m.starts_with(&format!("{}/", top))
            });
            if !covered {
                modules.insert(top);
            }
        }
    }

    // BTreeSet ordering puts "." first since it sorts before names.
    modules.into_iter().collect()
}

/// Files belonging to a module: everything under its path except subtrees
/// owned by a more specific module.
pub fn files_of_module(
    module_path: &str,
    rels: &[String],
    all_modules: &[String],
) -> Vec<String> {
    rels.iter()
        .filter(|rel| {
            if !in_dir(rel, module_path) {
                return false;
            }
            // Exclude subtrees of more specific modules.
            !all_modules.iter().any(|other| {
                other != module_path
                    && other != "."
                    && is_under(other, module_path)
                    && in_dir(rel, other)
            })
        })
        .cloned()
        .collect()
}

/// Is `rel` inside directory `dir` (`"."` contains everything)?
pub fn in_dir(rel: &str, dir: &str) -> bool {
    dir == "." || rel.starts_with(&format!("{}/", dir))
}

/// Is directory `child` strictly under directory `parent`?
fn is_under(child: &str, parent: &str) -> bool {
    parent == "." || child.starts_with(&format!("{}/", parent))
}

/// First real paragraph of the module's `README.md`: headings, badge lines
/// and fenced code are skipped, whitespace collapsed, length capped.
pub fn module_description(root: &Path, module_path: &str) -> Option<String> {
    let readme = if module_path == "." {
        root.join("README.md")
    } else {
        root.join(module_path).join("README.md")
    };
    let content = fs::read_to_string(readme).ok()?;
    first_paragraph(&content)
}

fn first_paragraph(content: &str) -> Option<String> {
    let mut in_fence = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            if !paragraph.is_empty() {
                break;
            }
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let is_content = !trimmed.is_empty()
            && !trimmed.starts_with('#')
            && !is_badge_line(trimmed)
            && !trimmed.starts_with("---");

        if is_content {
            paragraph.push(trimmed);
        } else if !paragraph.is_empty() {
            break;
        }
    }

    if paragraph.is_empty() {
        return None;
    }
    Some(base::truncate_chars(
        &base::collapse_whitespace(&paragraph.join(" ")),
        DESCRIPTION_MAX_CHARS,
    ))
}

fn is_badge_line(line: &str) -> bool {
    line.starts_with("[![") || line.starts_with("![")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn manifest_dirs_become_modules() {
        let rels = strings(&[
            "Cargo.toml",
            "src/lib.rs",
            "crates/core/Cargo.toml",
            "crates/core/src/lib.rs",
        ]);
        let modules = infer_module_paths(&rels);
        assert_eq!(modules, vec![".".to_string(), "crates/core".to_string()]);
    }

    #[test]
    fn code_roots_only_without_root_manifest() {
        let rels = strings(&["server/main.go", "web/app.ts", "notes/todo.txt"]);
        let modules = infer_module_paths(&rels);
        assert_eq!(
            modules,
            vec![".".to_string(), "server".to_string(), "web".to_string()]
        );
    }

    #[test]
    fn covered_top_level_dirs_are_not_duplicated() {
        let rels = strings(&[
            "packages/app/package.json",
            "packages/app/src/index.ts",
        ]);
        let modules = infer_module_paths(&rels);
        assert_eq!(modules, vec![".".to_string(), "packages/app".to_string()]);
    }

    #[test]
    fn module_files_exclude_nested_module_subtrees() {
        let rels = strings(&[
            "packages/app/src/index.ts",
            "packages/tools/gen.ts",
            "packages/app/package.json",
        ]);
        let modules = strings(&[".", "packages", "packages/app"]);
        let files = files_of_module("packages", &rels, &modules);
        assert_eq!(files, vec!["packages/tools/gen.ts".to_string()]);
    }

    #[test]
    fn first_paragraph_skips_heading_badge_and_fence() {
        let readme = "\
# Title

[![CI](https://example.com/badge.svg)](https://example.com)

```sh
cargo install demo
```

The real description
spans two lines.

Second paragraph is ignored.
";
        assert_eq!(
            first_paragraph(readme).as_deref(),
            Some("The real description spans two lines.")
        );
    }

    #[test]
    fn long_descriptions_are_capped() {
        let body = "word ".repeat(100);
        let readme = format!("# T\n\n{}\n", body);
        let desc = first_paragraph(&readme).unwrap();
        assert_eq!(desc.chars().count(), 200);
        assert!(desc.ends_with("..."));
    }
}
