// Builder Orchestration
//
// Runs the full pipeline for one build: git HEAD, cache load, config
// comparison, discovery, change analysis, extract-or-reuse per file, the
// three derived maps, and the ordered atomic write. Per-file failures become
// warnings; only the candidate cap and write failures are fatal, and both
// leave the previous artifact set intact.

use crate::artifacts::{self, writer::ArtifactSet, CachedSymbolLine, IndexMeta, IndexStatus};
use crate::config::{ConfigSnapshot, IndexConfig};
use crate::discovery::{self, DiscoveredFile};
use crate::errors::{BuildError, IndexWarning};
use crate::extractors::{ExtractorManager, SymbolAdapter};
use crate::incremental::{self, ChangeKind};
use crate::language;
use crate::repo_map;
use crate::test_map;
use crate::utils::fs as fsutil;
use chrono::{SecondsFormat, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

pub use crate::artifacts::IndexingStats;

/// Invoker-facing build parameters.
pub struct BuildOptions {
    pub repo_root: PathBuf,
    /// The workspace control directory (artifacts go to `<ark_dir>/index`)
    pub ark_dir: PathBuf,
    pub config: IndexConfig,
    /// Ignore every cached artifact and re-index from scratch
    pub force: bool,
    pub verbose: bool,
}

impl BuildOptions {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        let ark_dir = repo_root.join(".ark");
        Self {
            repo_root,
            ark_dir,
            config: IndexConfig::default(),
            force: false,
            verbose: false,
        }
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.ark_dir.join("index")
    }
}

/// What one build run reports back to the invoker.
#[derive(Debug)]
pub struct BuildOutcome {
    pub success: bool,
    pub error: Option<BuildError>,
    pub stats: IndexingStats,
    pub warnings: Vec<IndexWarning>,
}

pub struct IndexBuilder {
    options: BuildOptions,
    extractors: ExtractorManager,
}

impl IndexBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            extractors: ExtractorManager::new(),
        }
    }

    pub fn with_adapters(options: BuildOptions, adapters: Vec<Box<dyn SymbolAdapter>>) -> Self {
        Self {
            options,
            extractors: ExtractorManager::with_adapters(adapters),
        }
    }

    /// Run one build to completion.
    pub fn build(&self) -> BuildOutcome {
        let mut warnings = Vec::new();
        match self.run(&mut warnings) {
            Ok(stats) => BuildOutcome {
                success: true,
                error: None,
                stats,
                warnings,
            },
            Err(error) => {
                warn!("build failed: {}", error);
                BuildOutcome {
                    success: false,
                    error: Some(error),
                    stats: IndexingStats::default(),
                    warnings,
                }
            }
        }
    }

    fn run(&self, warnings: &mut Vec<IndexWarning>) -> Result<IndexingStats, BuildError> {
        let started = Instant::now();
        let root = &self.options.repo_root;
        let artifact_dir = self.options.artifact_dir();

        let git_commit = crate::git::resolve_head(root);
        debug!("git HEAD: {:?}", git_commit);

        if let Err(err) = fs::create_dir_all(&artifact_dir) {
            return Err(BuildError::new(
                crate::errors::BuildErrorCode::WriteError,
                format!(
                    "failed to create artifact directory {}: {}",
                    artifact_dir.display(),
                    err
                ),
            ));
        }

        // Load the previous artifact set as a read-only cache.
        let (previous_meta, previous_ledger, previous_symbols) = if self.options.force {
            (None, None, None)
        } else {
            (
                artifacts::load_previous_meta(&artifact_dir),
                artifacts::load_previous_ledger(&artifact_dir),
                artifacts::load_previous_symbols(&artifact_dir),
            )
        };

        let adapter_names = self.extractors.adapter_names();
        let mut snapshot = ConfigSnapshot::capture(&self.options.config, &adapter_names);

        let config_matches = previous_meta
            .as_ref()
            .map(|meta| snapshot.same_scope(&meta.config))
            .unwrap_or(false);
        let full_reindex = self.options.force
            || !config_matches
            || previous_ledger.is_none()
            || previous_symbols.is_none();
        if full_reindex && self.options.verbose {
            info!("full re-index (forced, first run, or configuration change)");
        }

        // Discovery. Exceeding the candidate cap is the one fatal outcome.
        let discovered = discovery::discover_files(root, &self.options.config)?;
        for skip in &discovered.skipped {
            warnings.push(IndexWarning::file_skipped(&skip.path, &skip.reason));
        }
        for err in &discovered.errors {
            warnings.push(IndexWarning::file_skipped(&err.path, &err.error));
        }

        let analysis = if full_reindex {
            incremental::analyze_changes(&discovered.files, None)
        } else {
            incremental::analyze_changes(&discovered.files, previous_ledger.as_ref())
        };
        let to_index: HashSet<String> = if full_reindex {
            discovered.files.iter().map(|f| f.rel_path.clone()).collect()
        } else {
            analysis.paths_to_index()
        };

        let empty_cache = HashMap::new();
        let symbol_cache = previous_symbols.as_ref().unwrap_or(&empty_cache);
        let (symbol_lines, adapters_used) =
            self.assemble_symbols(&discovered.files, &to_index, symbol_cache, warnings);
        snapshot.adapters_used = adapters_used;

        let map = repo_map::build_repo_map(root, &discovered.files);
        let tests = test_map::build_test_map(&discovered.files);
        let ledger = incremental::build_ledger(&discovered.files, &analysis, git_commit.clone());

        let stats = IndexingStats {
            total_files: discovered.files.len(),
            total_code_files: discovered
                .files
                .iter()
                .filter(|f| language::is_code_file(&f.rel_path))
                .count(),
            total_symbols: symbol_lines.len(),
            total_tests: tests.tests.len(),
            total_modules: map.modules.len(),
            files_new: analysis.count(ChangeKind::New),
            files_changed: analysis.count(ChangeKind::Changed),
            files_unchanged: analysis.count(ChangeKind::Unchanged),
            files_deleted: analysis.deleted.len(),
            incremental: !full_reindex,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        let status = if warnings.is_empty() {
            IndexStatus::Success
        } else {
            IndexStatus::Partial
        };
        let meta = IndexMeta {
            schema_version: artifacts::META_SCHEMA_VERSION.to_string(),
            tool_version: artifacts::TOOL_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            repo_root: root.display().to_string(),
            git_commit,
            status,
            stats: stats.clone(),
            config: snapshot,
            warnings: warnings.clone(),
        };

        artifacts::writer::write_artifacts(
            &artifact_dir,
            &ArtifactSet {
                ledger,
                symbol_lines,
                repo_map: map,
                test_map: tests,
                meta,
            },
        )?;

        info!(
            "indexed {} files ({} symbols, {} tests) in {} ms",
            stats.total_files, stats.total_symbols, stats.total_tests, stats.duration_ms
        );
        Ok(stats)
    }

    /// Produce the symbol stream in discovery order: fresh extraction for
    /// files in the to-index set, verbatim cached lines for the rest.
    fn assemble_symbols(
        &self,
        files: &[DiscoveredFile],
        to_index: &HashSet<String>,
        cache: &HashMap<String, Vec<CachedSymbolLine>>,
        warnings: &mut Vec<IndexWarning>,
    ) -> (Vec<String>, Vec<String>) {
        let mut lines = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut adapters_used: BTreeSet<String> = BTreeSet::new();
        let has_adapters = !self.extractors.adapter_names().is_empty();

        for file in files {
            if to_index.contains(&file.rel_path) {
                // Nothing extracts from unknown languages unless an
                // adapter might claim the file.
                if !has_adapters && !language::is_code_file(&file.rel_path) {
                    continue;
                }
                if fsutil::is_binary(&file.abs_path) {
                    debug!("skipping binary content: {}", file.rel_path);
                    continue;
                }
                let content = match fs::read_to_string(&file.abs_path) {
                    Ok(content) => content,
                    Err(err) => {
                        warnings.push(IndexWarning::extraction_error(
                            &file.rel_path,
                            format!("failed to read source: {}", err),
                        ));
                        continue;
                    }
                };

                let outcome = self.extractors.extract(&file.rel_path, &content);
                if let Some(name) = outcome.adapter_used {
                    adapters_used.insert(name);
                }
                for symbol in &outcome.symbols {
                    if !seen_ids.insert(symbol.symbol_id.clone()) {
                        warn!("duplicate symbol id suppressed: {}", symbol.symbol_id);
                        continue;
                    }
                    match serde_json::to_string(symbol) {
                        Ok(line) => lines.push(line),
                        Err(err) => warnings.push(IndexWarning::extraction_error(
                            &file.rel_path,
                            format!("failed to serialize symbol: {}", err),
                        )),
                    }
                }
            } else if let Some(cached) = cache.get(&file.rel_path) {
                for line in cached {
                    if !seen_ids.insert(line.symbol_id.clone()) {
                        warn!("duplicate cached symbol id suppressed: {}", line.symbol_id);
                        continue;
                    }
                    lines.push(line.raw.clone());
                }
            }
        }

        (lines, adapters_used.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_derive_ark_dir() {
        let options = BuildOptions::new("/repo");
        assert_eq!(options.ark_dir, PathBuf::from("/repo/.ark"));
        assert_eq!(options.artifact_dir(), PathBuf::from("/repo/.ark/index"));
        assert!(!options.force);
    }
}
