// Base Extractor Types for Ark Index
//
// This module defines the symbol model shared by all language extractors and
// external adapters, plus the stable-id allocation that both go through.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Signature and docstring summaries are capped at this many characters.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Bodiless declarations (constants and the like) use the raw line, capped
/// tighter than real signatures.
pub const BARE_LINE_MAX_CHARS: usize = 100;

/// A 1-indexed line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

/// Source span of a symbol declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Span covering one source line.
    pub fn line(line: u32, line_text: &str) -> Self {
        Self {
            start: Position { line, col: 1 },
            end: Position {
                line,
                col: line_text.chars().count() as u32 + 1,
            },
        }
    }
}

/// Kind of symbol in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Method,
    Interface,
    Type,
    Enum,
    Constant,
    Module,
    Variable,
}

/// Visibility of a symbol at its declaration site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Export,
    Public,
    Private,
    Internal,
}

/// One record in `symbols.jsonl`.
///
/// `top_callers`, `top_callees` and `tags` are reserved for coverage
/// plug-ins and stay empty in a plain build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring_summary: Option<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub top_callers: Vec<String>,
    #[serde(default)]
    pub top_callees: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// What extractors and adapters produce before id allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDraft {
    /// Bare name as declared (no container qualification)
    pub name: String,
    /// Enclosing type for methods
    pub container: Option<String>,
    /// Separator between container and name (`"."`, or `"::"` for Rust)
    pub container_sep: &'static str,
    pub kind: SymbolKind,
    /// 1-indexed declaration line
    pub line: u32,
    pub span: Option<Span>,
    pub signature: Option<String>,
    pub docstring_summary: Option<String>,
    pub visibility: Visibility,
}

impl SymbolDraft {
    pub fn new(name: impl Into<String>, kind: SymbolKind, line: u32) -> Self {
        Self {
            name: name.into(),
            container: None,
            container_sep: ".",
            kind,
            line,
            span: None,
            signature: None,
            docstring_summary: None,
            visibility: Visibility::Public,
        }
    }

    /// The display name: `Container.Name` (or `Container::Name`) when a
    /// container is present, the bare name otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.container {
            Some(container) => format!("{}{}{}", container, self.container_sep, self.name),
            None => self.name.clone(),
        }
    }
}

/// Allocates stable `symbol_id`s for one file.
///
/// The base id is `{file}::{qualified_name}`. Collisions are tracked on the
/// *bare* name: the first symbol with a given bare name keeps the base id,
/// every later one gets a `:L{line}` suffix. The asymmetry is deliberate --
/// it keeps the first occurrence's id stable across runs even when a
/// colliding declaration is added later in the file.
#[derive(Debug)]
pub struct SymbolIdAllocator {
    file: String,
    seen_names: HashSet<String>,
}

impl SymbolIdAllocator {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            seen_names: HashSet::new(),
        }
    }

    /// Turn a draft into a finished symbol with its stable id.
    pub fn finish(&mut self, draft: SymbolDraft) -> Symbol {
        let qualified = draft.qualified_name();
        let collided = !self.seen_names.insert(draft.name.clone());
        let symbol_id = if collided {
            format!("{}::{}:L{}", self.file, qualified, draft.line)
        } else {
            format!("{}::{}", self.file, qualified)
        };

        Symbol {
            symbol_id,
            name: qualified,
            kind: draft.kind,
            file: self.file.clone(),
            span: draft.span,
            signature: draft.signature,
            docstring_summary: draft.docstring_summary,
            visibility: draft.visibility,
            top_callers: Vec::new(),
            top_callees: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn finish_all(&mut self, drafts: Vec<SymbolDraft>) -> Vec<Symbol> {
        drafts.into_iter().map(|d| self.finish(d)).collect()
    }
}

/// Collapse internal whitespace runs to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Char-safe truncation with a `...` marker.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

/// Normalize a declaration head into a signature: collapsed whitespace,
/// capped length.
pub fn signature_from(head: &str) -> String {
    truncate_chars(&collapse_whitespace(head), SUMMARY_MAX_CHARS)
}

/// Bodiless declarations keep the line itself, trimmed and tightly capped.
pub fn bare_line_signature(line: &str) -> String {
    truncate_chars(line.trim(), BARE_LINE_MAX_CHARS)
}

/// Summarize a doc comment: the first non-empty line that is not a `@tag`
/// line, collapsed and capped.
pub fn doc_summary<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('@') {
            continue;
        }
        return Some(truncate_chars(&collapse_whitespace(trimmed), SUMMARY_MAX_CHARS));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_id_without_collision() {
        let mut alloc = SymbolIdAllocator::new("src/a.ts");
        let sym = alloc.finish(SymbolDraft::new("f", SymbolKind::Function, 1));
        assert_eq!(sym.symbol_id, "src/a.ts::f");
        assert_eq!(sym.name, "f");
    }

    #[test]
    fn collision_suffixes_second_occurrence_only() {
        let mut alloc = SymbolIdAllocator::new("src/a.ts");
        let first = alloc.finish(SymbolDraft::new("f", SymbolKind::Function, 1));
        let mut method = SymbolDraft::new("f", SymbolKind::Method, 5);
        method.container = Some("C".to_string());
        let second = alloc.finish(method);

        assert_eq!(first.symbol_id, "src/a.ts::f");
        assert_eq!(second.symbol_id, "src/a.ts::C.f:L5");
        assert_eq!(second.name, "C.f");
    }

    #[test]
    fn rust_methods_use_double_colon() {
        let mut draft = SymbolDraft::new("new", SymbolKind::Method, 3);
        draft.container = Some("S".to_string());
        draft.container_sep = "::";
        let mut alloc = SymbolIdAllocator::new("src/lib.rs");
        let sym = alloc.finish(draft);
        assert_eq!(sym.name, "S::new");
        assert_eq!(sym.symbol_id, "src/lib.rs::S::new");
    }

    #[test]
    fn truncation_is_char_safe_and_marked() {
        let long = "x".repeat(300);
        let cut = truncate_chars(&long, SUMMARY_MAX_CHARS);
        assert_eq!(cut.chars().count(), SUMMARY_MAX_CHARS);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_chars("short", 200), "short");
    }

    #[test]
    fn doc_summary_skips_tag_lines() {
        let lines = vec!["@param x the input", "", "Adds two numbers."];
        assert_eq!(doc_summary(lines).as_deref(), Some("Adds two numbers."));
        assert_eq!(doc_summary(vec!["@internal"]), None);
    }

    #[test]
    fn signature_collapses_whitespace() {
        assert_eq!(
            signature_from("fn  add(a: i32,\n       b: i32) -> i32"),
            "fn add(a: i32, b: i32) -> i32"
        );
    }
}
