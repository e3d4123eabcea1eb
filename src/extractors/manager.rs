//! ExtractorManager - dispatch between adapters and the regex baseline
//!
//! Adapters are tried in registration order; the first one that reports
//! availability and returns a non-empty draft list pre-empts the baseline
//! for that file. An adapter failure falls through, never aborts.

use crate::extractors::base::{Symbol, SymbolDraft, SymbolIdAllocator};
use crate::extractors::{go, python, rust, typescript};
use anyhow::Result;
use tracing::{debug, warn};

/// An external symbol source that can pre-empt the regex baseline.
///
/// The baseline is the implicit terminal adapter: it runs when no adapter
/// is available or every available one comes back empty.
pub trait SymbolAdapter: Send {
    fn name(&self) -> &str;

    /// Cheap probe; an unavailable adapter is skipped without calling
    /// `extract_symbols`.
    fn is_available(&self) -> bool;

    /// Produce drafts for one file. Ids are allocated afterwards through
    /// the same mechanism as baseline symbols.
    fn extract_symbols(&self, rel_path: &str, content: &str) -> Result<Vec<SymbolDraft>>;
}

/// What one extraction pass produced.
pub struct ExtractionOutcome {
    pub symbols: Vec<Symbol>,
    /// Name of the adapter that pre-empted the baseline, if any
    pub adapter_used: Option<String>,
}

/// Runs adapters and the per-language baseline extractors.
pub struct ExtractorManager {
    adapters: Vec<Box<dyn SymbolAdapter>>,
}

impl ExtractorManager {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    pub fn with_adapters(adapters: Vec<Box<dyn SymbolAdapter>>) -> Self {
        Self { adapters }
    }

    /// Names of all registered adapters, for the `meta.config` snapshot.
    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// Extract symbols for one file, adapters first, baseline as fallback.
    pub fn extract(&self, rel_path: &str, content: &str) -> ExtractionOutcome {
        for adapter in &self.adapters {
            if !adapter.is_available() {
                continue;
            }
            match adapter.extract_symbols(rel_path, content) {
                Ok(drafts) if !drafts.is_empty() => {
                    debug!("adapter {} handled {}", adapter.name(), rel_path);
                    let mut alloc = SymbolIdAllocator::new(rel_path);
                    return ExtractionOutcome {
                        symbols: alloc.finish_all(drafts),
                        adapter_used: Some(adapter.name().to_string()),
                    };
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(
                        "adapter {} failed on {}: {}; falling back",
                        adapter.name(),
                        rel_path,
                        err
                    );
                }
            }
        }

        ExtractionOutcome {
            symbols: self.baseline(rel_path, content),
            adapter_used: None,
        }
    }

    fn baseline(&self, rel_path: &str, content: &str) -> Vec<Symbol> {
        let drafts = match crate::language::language_of(rel_path) {
            "typescript" | "javascript" => typescript::extract_drafts(content),
            "python" => python::extract_drafts(content),
            "rust" => rust::extract_drafts(content),
            "go" => go::extract_drafts(content),
            _ => Vec::new(),
        };
        let mut alloc = SymbolIdAllocator::new(rel_path);
        alloc.finish_all(drafts)
    }
}

impl Default for ExtractorManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::SymbolKind;

    struct FixedAdapter {
        name: String,
        available: bool,
        drafts: Vec<SymbolDraft>,
    }

    impl SymbolAdapter for FixedAdapter {
        fn name(&self) -> &str {
            &self.name
        }
        fn is_available(&self) -> bool {
            self.available
        }
        fn extract_symbols(&self, _rel_path: &str, _content: &str) -> Result<Vec<SymbolDraft>> {
            Ok(self.drafts.clone())
        }
    }

    #[test]
    fn baseline_dispatches_by_language() {
        let manager = ExtractorManager::new();
        let outcome = manager.extract("src/a.ts", "export function f() {}\n");
        assert_eq!(outcome.symbols.len(), 1);
        assert!(outcome.adapter_used.is_none());

        let outcome = manager.extract("README.md", "# hello\n");
        assert!(outcome.symbols.is_empty());
    }

    #[test]
    fn available_non_empty_adapter_preempts_baseline() {
        let adapter = FixedAdapter {
            name: "oracle".to_string(),
            available: true,
            drafts: vec![SymbolDraft::new("fromAdapter", SymbolKind::Function, 1)],
        };
        let manager = ExtractorManager::with_adapters(vec![Box::new(adapter)]);
        let outcome = manager.extract("src/a.ts", "export function f() {}\n");
        assert_eq!(outcome.symbols.len(), 1);
        assert_eq!(outcome.symbols[0].name, "fromAdapter");
        assert_eq!(outcome.symbols[0].symbol_id, "src/a.ts::fromAdapter");
        assert_eq!(outcome.adapter_used.as_deref(), Some("oracle"));
    }

    #[test]
    fn empty_or_unavailable_adapters_fall_through() {
        let unavailable = FixedAdapter {
            name: "offline".to_string(),
            available: false,
            drafts: vec![SymbolDraft::new("ignored", SymbolKind::Function, 1)],
        };
        let empty = FixedAdapter {
            name: "quiet".to_string(),
            available: true,
            drafts: Vec::new(),
        };
        let manager =
            ExtractorManager::with_adapters(vec![Box::new(unavailable), Box::new(empty)]);
        let outcome = manager.extract("src/a.ts", "export function f() {}\n");
        assert_eq!(outcome.symbols[0].name, "f");
        assert!(outcome.adapter_used.is_none());
    }
}
