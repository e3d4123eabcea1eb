// Python extractor
//
// Regex baseline over full file text, tracking the current class by
// indentation. Recognized: module-level functions and classes, methods one
// level into a class, and ALL_CAPS module-level constants. Docstrings are
// the triple-quoted string on the first statement after a definition header.

use crate::extractors::base::{
    self, Span, Symbol, SymbolDraft, SymbolIdAllocator, SymbolKind, Visibility,
};
use regex::Regex;
use std::sync::OnceLock;

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^class\s+([A-Za-z_]\w*)").unwrap())
}

fn def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap())
}

fn constant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z][A-Z0-9_]*)\s*=").unwrap())
}

/// Class currently open while scanning, by indentation.
struct ClassContext {
    name: String,
    indent: usize,
    /// Indent of the first statement in the body; methods live exactly here
    body_indent: Option<usize>,
}

pub struct PythonExtractor {
    alloc: SymbolIdAllocator,
}

impl PythonExtractor {
    pub fn new(file_path: String) -> Self {
        Self {
            alloc: SymbolIdAllocator::new(file_path),
        }
    }

    pub fn extract_symbols(&mut self, content: &str) -> Vec<Symbol> {
        self.alloc.finish_all(extract_drafts(content))
    }
}

pub fn extract_drafts(content: &str) -> Vec<SymbolDraft> {
    let lines: Vec<&str> = content.lines().collect();
    let mut drafts = Vec::new();
    let mut class_ctx: Option<ClassContext> = None;

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = raw.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = raw.len() - trimmed.len();

        // A statement at or left of the class keyword ends the class body.
        if let Some(ctx) = &mut class_ctx {
            if indent <= ctx.indent {
                class_ctx = None;
            } else if ctx.body_indent.is_none() {
                ctx.body_indent = Some(indent);
            }
        }

        if let Some(caps) = class_re().captures(trimmed) {
            if indent == 0 {
                let name = caps[1].to_string();
                let mut draft = SymbolDraft::new(&name, SymbolKind::Class, line_no);
                draft.span = Some(Span::line(line_no, raw));
                draft.signature = Some(base::signature_from(header_of(trimmed)));
                draft.docstring_summary = docstring_after(&lines, idx);
                draft.visibility = visibility_of(&name);
                drafts.push(draft);
                class_ctx = Some(ClassContext {
                    name,
                    indent,
                    body_indent: None,
                });
            }
            continue;
        }

        if let Some(caps) = def_re().captures(trimmed) {
            let name = caps[1].to_string();
            let in_class = class_ctx
                .as_ref()
                .filter(|ctx| ctx.body_indent == Some(indent))
                .map(|ctx| ctx.name.clone());

            if indent == 0 || in_class.is_some() {
                let kind = if in_class.is_some() {
                    SymbolKind::Method
                } else {
                    SymbolKind::Function
                };
                let mut draft = SymbolDraft::new(&name, kind, line_no);
                draft.container = in_class;
                draft.span = Some(Span::line(line_no, raw));
                draft.signature = Some(base::signature_from(header_of(trimmed)));
                draft.docstring_summary = docstring_after(&lines, idx);
                draft.visibility = visibility_of(&name);
                drafts.push(draft);
            }
            continue;
        }

        if indent == 0 {
            if let Some(caps) = constant_re().captures(trimmed) {
                let name = caps[1].to_string();
                let mut draft = SymbolDraft::new(&name, SymbolKind::Constant, line_no);
                draft.span = Some(Span::line(line_no, raw));
                draft.signature = Some(base::bare_line_signature(trimmed));
                draft.visibility = visibility_of(&name);
                drafts.push(draft);
            }
        }
    }

    drafts
}

/// Leading-underscore convention: `__name` private, `_name` internal.
fn visibility_of(name: &str) -> Visibility {
    if name.starts_with("__") {
        Visibility::Private
    } else if name.starts_with('_') {
        Visibility::Internal
    } else {
        Visibility::Export
    }
}

/// Definition head without the trailing colon.
fn header_of(trimmed: &str) -> &str {
    trimmed.trim_end().trim_end_matches(':')
}

/// Triple-quoted docstring on the first statement after a definition
/// header: the whole string when single-line, its first text line when
/// multi-line.
fn docstring_after(lines: &[&str], def_idx: usize) -> Option<String> {
    let mut i = def_idx + 1;
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    let first = lines.get(i)?.trim();

    let quote = if first.starts_with("\"\"\"") {
        "\"\"\""
    } else if first.starts_with("'''") {
        "'''"
    } else {
        return None;
    };

    let rest = &first[quote.len()..];
    if let Some(end) = rest.find(quote) {
        return base::doc_summary([&rest[..end]]);
    }
    if !rest.trim().is_empty() {
        return base::doc_summary([rest]);
    }
    // Opening quotes alone on the line: the summary is the next text line.
    let next = lines.get(i + 1)?.trim().trim_end_matches(quote);
    base::doc_summary([next])
}
