// Repo Map Builder
//
// Turns one discovery pass into the structural `repo_map.json` artifact:
// modules, important subdirectories, key files, entrypoints, ownership,
// canonical build commands and a directory overview. Apart from README,
// CODEOWNERS and manifest reads, everything here is a pure function of the
// discovered file list, so it is cheap to test from synthetic lists.

pub mod build_commands;
pub mod entrypoints;
pub mod key_files;
pub mod modules;
pub mod overview;
pub mod ownership;
pub mod subdirs;

use crate::discovery::DiscoveredFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub use build_commands::BuildCommands;
pub use entrypoints::{Entrypoint, EntrypointKind};
pub use key_files::FileMetrics;
pub use overview::{DirectoryOverview, TopDirectory};
pub use subdirs::SubDirectory;

pub const REPO_MAP_SCHEMA_VERSION: &str = "1.1.0";

/// Number of key files surfaced per module.
pub const MODULE_KEY_FILE_CAP: usize = 15;

/// One module in the map; the repository root is `"."`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub path: String,
    pub description: Option<String>,
    pub entrypoints: Vec<Entrypoint>,
    pub key_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdirectories: Option<Vec<SubDirectory>>,
    /// Reserved for future summarization passes
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

/// The persisted `repo_map.json` artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMap {
    pub schema_version: String,
    pub modules: Vec<Module>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub owners: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_commands: Option<BuildCommands>,
    pub overview: DirectoryOverview,
}

/// Build the full repo map for one discovery pass.
pub fn build_repo_map(root: &Path, files: &[DiscoveredFile]) -> RepoMap {
    let rels: Vec<String> = files.iter().map(|f| f.rel_path.clone()).collect();
    let metrics = key_files::collect_metrics(root, files);

    let module_paths = modules::infer_module_paths(&rels);
    debug!("inferred {} modules", module_paths.len());

    let mut emitted = Vec::with_capacity(module_paths.len());
    for module_path in &module_paths {
        let is_root = module_path == ".";
        let module_files = modules::files_of_module(module_path, &rels, &module_paths);

        let subdirectories = if is_root {
            None
        } else {
            let subs = subdirs::detect_subdirectories(module_path, &module_files, &metrics);
            if subs.is_empty() {
                None
            } else {
                Some(subs)
            }
        };

        let key_files = key_files::select_for_module(
            module_path,
            &module_files,
            subdirectories.as_deref().unwrap_or(&[]),
            &metrics,
        );

        emitted.push(Module {
            path: module_path.clone(),
            description: modules::module_description(root, module_path),
            entrypoints: entrypoints::detect_entrypoints(module_path, &rels),
            key_files,
            subdirectories,
            responsibilities: Vec::new(),
        });
    }

    let map = RepoMap {
        schema_version: REPO_MAP_SCHEMA_VERSION.to_string(),
        modules: emitted,
        owners: ownership::parse_codeowners(root),
        build_commands: build_commands::detect_build_commands(root),
        overview: overview::build_overview(&rels),
    };
    info!(
        "repo map: {} modules, {} owner patterns",
        map.modules.len(),
        map.owners.len()
    );
    map
}
