// Language classification
//
// Extension-based mapping into the nine supported source families. Shared by
// discovery (code-file predicate), the repo map (code roots, histograms) and
// the test map (framework selection).

/// Resolve a relative path to its language family name.
///
/// Anything outside the nine supported families answers `"unknown"`.
pub fn language_of(rel_path: &str) -> &'static str {
    match extension_of(rel_path) {
        Some("ts") | Some("tsx") => "typescript",
        Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => "javascript",
        Some("py") | Some("pyi") => "python",
        Some("rs") => "rust",
        Some("go") => "go",
        Some("java") => "java",
        Some("c") | Some("h") => "c",
        Some("cpp") | Some("cc") | Some("cxx") | Some("hpp") | Some("hxx") => "cpp",
        Some("cs") => "csharp",
        _ => "unknown",
    }
}

/// True when the path carries a code extension from a supported family.
pub fn is_code_file(rel_path: &str) -> bool {
    language_of(rel_path) != "unknown"
}

/// Lowercased extension of a forward-slash relative path.
pub fn extension_of(rel_path: &str) -> Option<&str> {
    let name = crate::utils::paths::file_name(rel_path);
    // A leading dot is a hidden-file marker, not an extension separator.
    let stem = name.strip_prefix('.').unwrap_or(name);
    stem.rfind('.').map(|idx| &stem[idx + 1..])
}
