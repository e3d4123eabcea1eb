//! Entrypoint detection
//!
//! Deterministic basename patterns: `main.*` executes, `index.*`-style files
//! anchor a module, `lib.*` exposes a library. Only direct children of the
//! module directory count; the root module additionally promotes everything
//! under `bin/` to executable.

use crate::utils::paths;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrypointKind {
    Executable,
    Module,
    Library,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrypoint {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntrypointKind,
    pub description: Option<String>,
}

/// Classify a basename; `None` for non-entrypoint files.
pub fn classify(file_name: &str) -> Option<EntrypointKind> {
    match file_name {
        "main.ts" | "main.js" | "main.mjs" | "main.go" | "main.rs" | "main.py" => {
            Some(EntrypointKind::Executable)
        }
        "index.ts" | "index.js" | "index.mjs" | "index.py" | "mod.rs" | "__init__.py" => {
            Some(EntrypointKind::Module)
        }
        "lib.ts" | "lib.js" | "lib.rs" => Some(EntrypointKind::Library),
        _ => None,
    }
}

/// Entrypoints of one module, sorted by path.
pub fn detect_entrypoints(module_path: &str, rels: &[String]) -> Vec<Entrypoint> {
    let is_root = module_path == ".";
    let mut found = Vec::new();

    for rel in rels {
        let parent = paths::parent_dir(rel);
        let direct_child = if is_root {
            parent.is_empty()
        } else {
            parent == module_path
        };

        if direct_child {
            if let Some(kind) = classify(paths::file_name(rel)) {
                found.push(Entrypoint {
                    path: rel.clone(),
                    kind,
                    description: None,
                });
                continue;
            }
        }

        // Everything under bin/ is executable by convention.
        if is_root && rel.starts_with("bin/") {
            found.push(Entrypoint {
                path: rel.clone(),
                kind: EntrypointKind::Executable,
                description: None,
            });
        }
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}
