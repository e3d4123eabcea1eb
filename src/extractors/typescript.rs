// TypeScript / JavaScript extractor
//
// Line-anchored regex baseline over full file text. Only export-marked forms
// are recognized at top level (`default` accepted); methods are picked up one
// brace level inside an exported class with a name-followed-by-parens
// heuristic guarded by a keyword filter.

use crate::extractors::base::{
    self, Span, Symbol, SymbolDraft, SymbolIdAllocator, SymbolKind, Visibility,
};
use regex::Regex;
use std::sync::OnceLock;

/// Names the cheap `name(` heuristic must never treat as methods.
const JS_KEYWORDS: [&str; 31] = [
    "if", "else", "for", "while", "do", "switch", "case", "return", "throw", "try", "catch",
    "finally", "new", "typeof", "instanceof", "void", "delete", "await", "yield", "import",
    "export", "default", "from", "as", "with", "debugger", "super", "this", "constructor", "get",
    "set",
];

fn export_function_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*export\s+(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)")
            .unwrap()
    })
}

fn export_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*export\s+(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)")
            .unwrap()
    })
}

fn export_interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*export\s+(?:default\s+)?interface\s+([A-Za-z_$][\w$]*)").unwrap()
    })
}

fn export_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*export\s+type\s+([A-Za-z_$][\w$]*)").unwrap())
}

fn export_enum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*export\s+(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)").unwrap())
}

fn export_variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*export\s+(?:const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap()
    })
}

fn method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:(private)\s+|public\s+|protected\s+|static\s+|readonly\s+|async\s+|override\s+)*\*?\s*(#?[A-Za-z_$][\w$]*)\s*\(",
        )
        .unwrap()
    })
}

pub struct TypeScriptExtractor {
    alloc: SymbolIdAllocator,
}

impl TypeScriptExtractor {
    pub fn new(file_path: String) -> Self {
        Self {
            alloc: SymbolIdAllocator::new(file_path),
        }
    }

    pub fn extract_symbols(&mut self, content: &str) -> Vec<Symbol> {
        let drafts = extract_drafts(content);
        self.alloc.finish_all(drafts)
    }
}

/// Draft extraction, shared with the adapter finishing path.
pub fn extract_drafts(content: &str) -> Vec<SymbolDraft> {
    let lines: Vec<&str> = content.lines().collect();
    let mut drafts = Vec::new();

    // Current exported class, its entry brace depth, and running depth.
    let mut class_ctx: Option<(String, i32)> = None;
    let mut depth: i32 = 0;

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;

        if let Some(caps) = export_class_re().captures(raw) {
            let name = caps[1].to_string();
            drafts.push(draft_for(
                &name,
                SymbolKind::Class,
                line_no,
                raw,
                &lines,
                idx,
            ));
            class_ctx = Some((name, depth));
        } else if let Some(caps) = export_function_re().captures(raw) {
            drafts.push(draft_for(
                &caps[1],
                SymbolKind::Function,
                line_no,
                raw,
                &lines,
                idx,
            ));
        } else if let Some(caps) = export_interface_re().captures(raw) {
            drafts.push(draft_for(
                &caps[1],
                SymbolKind::Interface,
                line_no,
                raw,
                &lines,
                idx,
            ));
        } else if let Some(caps) = export_enum_re().captures(raw) {
            drafts.push(draft_for(
                &caps[1],
                SymbolKind::Enum,
                line_no,
                raw,
                &lines,
                idx,
            ));
        } else if let Some(caps) = export_type_re().captures(raw) {
            drafts.push(draft_for(
                &caps[1],
                SymbolKind::Type,
                line_no,
                raw,
                &lines,
                idx,
            ));
        } else if let Some(caps) = export_variable_re().captures(raw) {
            drafts.push(draft_for(
                &caps[1],
                SymbolKind::Variable,
                line_no,
                raw,
                &lines,
                idx,
            ));
        } else if let Some((class_name, entry_depth)) = class_ctx.clone() {
            // Methods are recognized one level inside the class body only.
            if depth == entry_depth + 1 {
                if let Some(caps) = method_re().captures(raw) {
                    let name = caps[2].to_string();
                    let bare = name.trim_start_matches('#');
                    if !JS_KEYWORDS.contains(&bare) {
                        let mut draft =
                            draft_for(&name, SymbolKind::Method, line_no, raw, &lines, idx);
                        draft.container = Some(class_name);
                        draft.visibility =
                            if caps.get(1).is_some() || name.starts_with('#') {
                                Visibility::Private
                            } else {
                                Visibility::Export
                            };
                        drafts.push(draft);
                    }
                }
            }
        }

        depth += brace_delta(raw);
        if let Some((_, entry_depth)) = class_ctx {
            if depth <= entry_depth {
                class_ctx = None;
            }
        }
    }

    drafts
}

fn draft_for(
    name: &str,
    kind: SymbolKind,
    line_no: u32,
    raw: &str,
    lines: &[&str],
    idx: usize,
) -> SymbolDraft {
    let mut draft = SymbolDraft::new(name, kind, line_no);
    draft.span = Some(Span::line(line_no, raw));
    draft.signature = Some(match kind {
        SymbolKind::Variable | SymbolKind::Type => base::bare_line_signature(raw),
        _ => base::signature_from(declaration_head(raw)),
    });
    draft.docstring_summary = doc_above(lines, idx);
    draft.visibility = Visibility::Export;
    draft
}

/// Everything before the body opener.
fn declaration_head(line: &str) -> &str {
    match line.find('{') {
        Some(pos) => line[..pos].trim_end(),
        None => line.trim_end(),
    }
}

fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    for ch in line.chars() {
        match ch {
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// JSDoc block or contiguous `//` comment immediately above the
/// declaration, summarized with `@tag` lines skipped.
fn doc_above(lines: &[&str], decl_idx: usize) -> Option<String> {
    if decl_idx == 0 {
        return None;
    }
    let above = lines[decl_idx - 1].trim();

    if above.ends_with("*/") {
        let mut block = Vec::new();
        for i in (0..decl_idx).rev() {
            let trimmed = lines[i].trim();
            let inner = trimmed
                .trim_end_matches("*/")
                .trim_start_matches("/**")
                .trim_start_matches("/*")
                .trim_start_matches('*')
                .trim();
            block.push(inner.to_string());
            if trimmed.starts_with("/*") {
                break;
            }
        }
        block.reverse();
        return base::doc_summary(block.iter().map(String::as_str));
    }

    if above.starts_with("//") {
        let mut block = Vec::new();
        for i in (0..decl_idx).rev() {
            let trimmed = lines[i].trim();
            if !trimmed.starts_with("//") {
                break;
            }
            block.push(trimmed.trim_start_matches('/').trim().to_string());
        }
        block.reverse();
        return base::doc_summary(block.iter().map(String::as_str));
    }

    None
}
