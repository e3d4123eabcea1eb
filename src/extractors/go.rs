// Go extractor
//
// Line-anchored regex baseline. Methods are receiver-qualified
// (`Type.Method`), visibility follows the exported-identifier convention
// (leading uppercase), and docs are the contiguous `//` lines above.

use crate::extractors::base::{
    self, Span, Symbol, SymbolDraft, SymbolIdAllocator, SymbolKind, Visibility,
};
use regex::Regex;
use std::sync::OnceLock;

fn method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^func\s+\(\s*\w+\s+\*?([A-Za-z_]\w*)[^)]*\)\s+([A-Za-z_]\w*)\s*\(").unwrap()
    })
}

fn func_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^func\s+([A-Za-z_]\w*)\s*[(\[]").unwrap())
}

fn struct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^type\s+([A-Za-z_]\w*)\s+struct\b").unwrap())
}

fn interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^type\s+([A-Za-z_]\w*)\s+interface\b").unwrap())
}

fn type_alias_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^type\s+([A-Za-z_]\w*)\s+=?\s*\S").unwrap())
}

fn const_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^const\s+([A-Za-z_]\w*)\b").unwrap())
}

fn var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^var\s+([A-Za-z_]\w*)\b").unwrap())
}

pub struct GoExtractor {
    alloc: SymbolIdAllocator,
}

impl GoExtractor {
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

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = raw.trim_start();

        let (name, container, kind) = if let Some(caps) = method_re().captures(trimmed) {
            (
                caps[2].to_string(),
                Some(caps[1].to_string()),
                SymbolKind::Method,
            )
        } else if let Some(caps) = func_re().captures(trimmed) {
            (caps[1].to_string(), None, SymbolKind::Function)
        } else if let Some(caps) = struct_re().captures(trimmed) {
            (caps[1].to_string(), None, SymbolKind::Class)
        } else if let Some(caps) = interface_re().captures(trimmed) {
            (caps[1].to_string(), None, SymbolKind::Interface)
        } else if let Some(caps) = const_re().captures(trimmed) {
            (caps[1].to_string(), None, SymbolKind::Constant)
        } else if let Some(caps) = var_re().captures(trimmed) {
            (caps[1].to_string(), None, SymbolKind::Variable)
        } else if let Some(caps) = type_alias_re().captures(trimmed) {
            (caps[1].to_string(), None, SymbolKind::Type)
        } else {
            continue;
        };

        let mut draft = SymbolDraft::new(&name, kind, line_no);
        draft.container = container;
        draft.span = Some(Span::line(line_no, raw));
        draft.signature = Some(match kind {
            SymbolKind::Constant | SymbolKind::Variable | SymbolKind::Type => {
                base::bare_line_signature(trimmed)
            }
            _ => base::signature_from(declaration_head(trimmed)),
        });
        draft.docstring_summary = doc_above(&lines, idx);
        draft.visibility = visibility_of(&name);
        drafts.push(draft);
    }

    drafts
}

/// The exported-identifier convention: a leading uppercase letter exports.
fn visibility_of(name: &str) -> Visibility {
    if name.chars().next().map(char::is_uppercase).unwrap_or(false) {
        Visibility::Export
    } else {
        Visibility::Private
    }
}

fn declaration_head(line: &str) -> &str {
    match line.find('{') {
        Some(pos) => line[..pos].trim_end(),
        None => line.trim_end(),
    }
}

/// Contiguous `//` comment lines immediately above the declaration.
fn doc_above(lines: &[&str], decl_idx: usize) -> Option<String> {
    let mut block = Vec::new();
    for i in (0..decl_idx).rev() {
        let trimmed = lines[i].trim();
        if !trimmed.starts_with("//") {
            break;
        }
        block.push(trimmed.trim_start_matches('/').trim().to_string());
    }
    block.reverse();
    base::doc_summary(block.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Vec<Symbol> {
        GoExtractor::new("main.go".to_string()).extract_symbols(content)
    }

    #[test]
    fn exported_and_private_functions() {
        let src = "package main\n\nfunc Hello() {}\n\nfunc helper() {}\n";
        let symbols = extract(src);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name, "Hello");
        assert_eq!(symbols[0].kind, SymbolKind::Function);
        assert_eq!(symbols[0].visibility, Visibility::Export);
        assert_eq!(symbols[1].name, "helper");
        assert_eq!(symbols[1].kind, SymbolKind::Function);
        assert_eq!(symbols[1].visibility, Visibility::Private);
    }

    #[test]
    fn receiver_methods_are_type_qualified() {
        let src = "\
type Server struct {}

func (s *Server) Start() error {
	return nil
}

func (s Server) stop() {}
";
        let symbols = extract(src);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Server", "Server.Start", "Server.stop"]);
        assert_eq!(symbols[1].kind, SymbolKind::Method);
        assert_eq!(symbols[1].symbol_id, "main.go::Server.Start");
        assert_eq!(symbols[2].visibility, Visibility::Private);
    }

    #[test]
    fn type_declarations_by_shape() {
        let src = "\
type Config struct {}
type Reader interface {}
type ID = string
type Handler func() error
const MaxSize = 10
var registry map[string]int
";
        let symbols = extract(src);
        assert_eq!(symbols[0].kind, SymbolKind::Class);
        assert_eq!(symbols[1].kind, SymbolKind::Interface);
        assert_eq!(symbols[2].kind, SymbolKind::Type);
        assert_eq!(symbols[3].kind, SymbolKind::Type);
        assert_eq!(symbols[4].kind, SymbolKind::Constant);
        assert_eq!(symbols[5].kind, SymbolKind::Variable);
    }

    #[test]
    fn doc_comment_above_declaration() {
        let src = "// Hello greets the world.\n// Second line.\nfunc Hello() {}\n";
        let symbols = extract(src);
        assert_eq!(
            symbols[0].docstring_summary.as_deref(),
            Some("Hello greets the world.")
        );
    }

    #[test]
    fn package_and_imports_are_ignored() {
        let src = "package server\n\nimport (\n\t\"fmt\"\n)\n\nfunc Run() {}\n";
        let symbols = extract(src);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "Run");
    }
}
