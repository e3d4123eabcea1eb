// Rust extractor
//
// Regex baseline over full file text. Module-level items only, with the
// `impl` context tracked by brace counting so functions inside `impl T` /
// `impl Trait for T` become `T::method`. Doc comments are contiguous `///`
// lines immediately above, tolerating `#[...]` attributes in between.

use crate::extractors::base::{
    self, Span, Symbol, SymbolDraft, SymbolIdAllocator, SymbolKind, Visibility,
};
use regex::Regex;
use std::sync::OnceLock;

fn fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(pub(?:\s*\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_]\w*)"#,
        )
        .unwrap()
    })
}

fn struct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(pub(?:\s*\([^)]*\))?\s+)?struct\s+([A-Za-z_]\w*)").unwrap())
}

fn trait_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(pub(?:\s*\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+([A-Za-z_]\w*)").unwrap()
    })
}

fn enum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(pub(?:\s*\([^)]*\))?\s+)?enum\s+([A-Za-z_]\w*)").unwrap())
}

fn const_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(pub(?:\s*\([^)]*\))?\s+)?(?:const|static)\s+(?:mut\s+)?([A-Za-z_]\w*)\s*:")
            .unwrap()
    })
}

fn impl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^impl(?:\s*<[^>]*>)?\s+(?:[\w:]+(?:<[^>]*>)?\s+for\s+)?([A-Za-z_]\w*)")
            .unwrap()
    })
}

/// An open `impl` block: the self type and the brace depth at its header.
struct ImplContext {
    container: String,
    entry_depth: i32,
    body_opened: bool,
}

pub struct RustExtractor {
    alloc: SymbolIdAllocator,
}

impl RustExtractor {
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
    let mut depth: i32 = 0;
    let mut impl_ctx: Option<ImplContext> = None;

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = raw.trim_start();

        if depth == 0 && impl_ctx.is_none() {
            if let Some(caps) = impl_re().captures(trimmed) {
                let entry_depth = depth;
                depth += brace_delta(trimmed);
                // A block that opens and closes on the impl line has no
                // body left to scan, so no context to track.
                if depth > entry_depth || !trimmed.contains('{') {
                    impl_ctx = Some(ImplContext {
                        container: caps[1].to_string(),
                        entry_depth,
                        body_opened: depth > entry_depth,
                    });
                }
                continue;
            }
        }

        let in_impl_body = impl_ctx
            .as_ref()
            .map(|ctx| depth == ctx.entry_depth + 1)
            .unwrap_or(false);

        if depth == 0 && impl_ctx.is_none() {
            if let Some(draft) = module_item(trimmed, raw, line_no, &lines, idx) {
                drafts.push(draft);
            }
        } else if in_impl_body {
            if let Some(caps) = fn_re().captures(trimmed) {
                let container = impl_ctx.as_ref().map(|ctx| ctx.container.clone());
                let mut draft = SymbolDraft::new(&caps[2], SymbolKind::Method, line_no);
                draft.container = container;
                draft.container_sep = "::";
                draft.span = Some(Span::line(line_no, raw));
                draft.signature = Some(base::signature_from(declaration_head(trimmed)));
                draft.docstring_summary = doc_above(&lines, idx);
                draft.visibility = visibility_of(caps.get(1).is_some());
                drafts.push(draft);
            }
        }

        depth += brace_delta(trimmed);
        if let Some(ctx) = &mut impl_ctx {
            if depth > ctx.entry_depth {
                ctx.body_opened = true;
            }
        }
        if let Some(ctx) = &impl_ctx {
            if ctx.body_opened && depth <= ctx.entry_depth {
                impl_ctx = None;
            }
        }
    }

    drafts
}

fn module_item(
    trimmed: &str,
    raw: &str,
    line_no: u32,
    lines: &[&str],
    idx: usize,
) -> Option<SymbolDraft> {
    let (caps, kind) = if let Some(c) = fn_re().captures(trimmed) {
        (c, SymbolKind::Function)
    } else if let Some(c) = struct_re().captures(trimmed) {
        (c, SymbolKind::Class)
    } else if let Some(c) = trait_re().captures(trimmed) {
        (c, SymbolKind::Interface)
    } else if let Some(c) = enum_re().captures(trimmed) {
        (c, SymbolKind::Enum)
    } else if let Some(c) = const_re().captures(trimmed) {
        (c, SymbolKind::Constant)
    } else {
        return None;
    };

    let mut draft = SymbolDraft::new(&caps[2], kind, line_no);
    draft.span = Some(Span::line(line_no, raw));
    draft.signature = Some(match kind {
        SymbolKind::Constant => base::bare_line_signature(trimmed),
        _ => base::signature_from(declaration_head(trimmed)),
    });
    draft.docstring_summary = doc_above(lines, idx);
    draft.visibility = visibility_of(caps.get(1).is_some());
    Some(draft)
}

fn visibility_of(has_pub: bool) -> Visibility {
    if has_pub {
        Visibility::Export
    } else {
        Visibility::Private
    }
}

fn declaration_head(line: &str) -> &str {
    match line.find('{') {
        Some(pos) => line[..pos].trim_end(),
        None => line.trim_end().trim_end_matches(';'),
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

/// Contiguous `///` lines immediately above, with `#[...]` attribute lines
/// tolerated between the docs and the declaration.
fn doc_above(lines: &[&str], decl_idx: usize) -> Option<String> {
    let mut block = Vec::new();
    for i in (0..decl_idx).rev() {
        let trimmed = lines[i].trim();
        if trimmed.starts_with("#[") || trimmed.ends_with(")]") && trimmed.starts_with('#') {
            continue;
        }
        if let Some(doc) = trimmed.strip_prefix("///") {
            block.push(doc.trim().to_string());
            continue;
        }
        break;
    }
    block.reverse();
    base::doc_summary(block.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Vec<Symbol> {
        RustExtractor::new("src/lib.rs".to_string()).extract_symbols(content)
    }

    #[test]
    fn struct_and_impl_method() {
        let src = "pub struct S {}\nimpl S {\n    pub fn new() -> S {\n        S {}\n    }\n}\n";
        let symbols = extract(src);
        assert_eq!(symbols.len(), 2);

        assert_eq!(symbols[0].name, "S");
        assert_eq!(symbols[0].kind, SymbolKind::Class);
        assert_eq!(symbols[0].visibility, Visibility::Export);

        assert_eq!(symbols[1].name, "S::new");
        assert_eq!(symbols[1].kind, SymbolKind::Method);
        assert_eq!(symbols[1].visibility, Visibility::Export);
        assert_eq!(symbols[1].symbol_id, "src/lib.rs::S::new");
    }

    #[test]
    fn trait_impl_methods_use_self_type() {
        let src = "\
pub trait Render {
    fn draw(&self);
}

pub struct Widget;

impl Render for Widget {
    fn draw(&self) {}
}
";
        let symbols = extract(src);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Render", "Widget", "Widget::draw"]);
        assert_eq!(symbols[2].visibility, Visibility::Private);
    }

    #[test]
    fn module_level_visibility() {
        let src = "pub fn public_api() {}\nfn helper() {}\npub(crate) fn scoped() {}\n";
        let symbols = extract(src);
        assert_eq!(symbols[0].visibility, Visibility::Export);
        assert_eq!(symbols[1].visibility, Visibility::Private);
        assert_eq!(symbols[2].visibility, Visibility::Export);
    }

    #[test]
    fn enums_traits_and_constants() {
        let src = "\
pub enum Mode { Fast, Slow }
pub trait Runner {}
pub const MAX_DEPTH: usize = 3;
static INTERNAL: &str = \"x\";
";
        let symbols = extract(src);
        assert_eq!(symbols[0].kind, SymbolKind::Enum);
        assert_eq!(symbols[1].kind, SymbolKind::Interface);
        assert_eq!(symbols[2].kind, SymbolKind::Constant);
        assert_eq!(symbols[3].kind, SymbolKind::Constant);
        assert_eq!(symbols[3].visibility, Visibility::Private);
    }

    #[test]
    fn doc_comments_tolerate_attributes() {
        let src = "\
/// Builds the widget tree.
#[derive(Debug)]
pub struct Builder {}
";
        let symbols = extract(src);
        assert_eq!(
            symbols[0].docstring_summary.as_deref(),
            Some("Builds the widget tree.")
        );
    }

    #[test]
    fn nested_functions_are_not_extracted() {
        let src = "pub fn outer() {\n    fn inner() {}\n}\n";
        let symbols = extract(src);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "outer");
    }

    #[test]
    fn enum_with_inline_braces_does_not_leak_depth() {
        let src = "pub enum Mode { Fast, Slow }\npub fn after() {}\n";
        let symbols = extract(src);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Mode", "after"]);
    }
}
