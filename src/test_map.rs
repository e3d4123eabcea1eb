// Test Map Builder
//
// Catalogs test files by path/name convention, parses test names with
// framework-specific line regexes, and assigns tier and tags heuristically.
// The parser is deliberately comment-blind: a commented-out test is still
// indexed, which keeps the scan cheap and the ids stable.

use crate::discovery::DiscoveredFile;
use crate::language;
use crate::utils::paths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::OnceLock;
use tracing::{debug, info};

pub const TEST_MAP_SCHEMA_VERSION: &str = "1.0.0";

/// Path segments that mark everything below them as tests.
const TEST_DIR_SEGMENTS: [&str; 8] = [
    "__tests__",
    "tests",
    "test",
    "spec",
    "specs",
    "__test__",
    "__spec__",
    "__specs__",
];

/// Fixed tag vocabulary intersected with path + name.
const KNOWN_TAGS: [&str; 8] = [
    "unit",
    "integration",
    "e2e",
    "smoke",
    "regression",
    "api",
    "ui",
    "component",
];

/// Path components that never name a package.
const NON_PACKAGE_SEGMENTS: [&str; 10] = [
    "src",
    "lib",
    "pkg",
    "internal",
    "cmd",
    "__tests__",
    "tests",
    "test",
    "spec",
    "specs",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestTier {
    Fast,
    Slow,
    Integration,
}

/// One cataloged test (or an unnamed placeholder for a test file that
/// parsed no names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEntry {
    pub test_id: String,
    pub file: String,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub tier: TestTier,
    /// Reserved for coverage plug-ins
    #[serde(default)]
    pub files_touched: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
}

/// The persisted `test_map.json` artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMap {
    pub schema_version: String,
    pub tests: Vec<TestEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framework {
    Jest,
    Pytest,
    GoTest,
    RustTest,
}

fn test_basename_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        vec![
            Regex::new(r"^.+\.(test|spec)\.[jt]sx?$").unwrap(),
            Regex::new(r"^.+_(test|spec)\.[jt]sx?$").unwrap(),
            Regex::new(r"^.+_test\.py$").unwrap(),
            Regex::new(r"^test_.+\.py$").unwrap(),
            Regex::new(r"^.+_test\.go$").unwrap(),
            Regex::new(r"^.+_test\.rs$").unwrap(),
            Regex::new(r"^tests\.rs$").unwrap(),
        ]
    })
}

fn jest_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\b(?:describe|it|test)\s*\(\s*['"`](.+?)['"`]"#).unwrap()
    })
}

fn pytest_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^def\s+(test_\w+)\s*\(").unwrap())
}

fn go_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^func\s+(Test\w*)\s*\(").unwrap())
}

fn rust_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#\[\s*(?:\w+::)*test\s*\]").unwrap())
}

fn rust_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:pub\s+)?(?:async\s+)?fn\s+(\w+)\s*\(").unwrap())
}

/// Is this code file a test by path or name convention?
pub fn is_test_file(rel_path: &str) -> bool {
    if !language::is_code_file(rel_path) {
        return false;
    }
    let name = paths::file_name(rel_path);
    if test_basename_res().iter().any(|re| re.is_match(name)) {
        return true;
    }
    rel_path
        .split('/')
        .rev()
        .skip(1)
        .any(|segment| TEST_DIR_SEGMENTS.contains(&segment))
}

fn detect_framework(rel_path: &str) -> Option<Framework> {
    match language::extension_of(rel_path)? {
        "go" => Some(Framework::GoTest),
        "rs" => Some(Framework::RustTest),
        "py" => Some(Framework::Pytest),
        "ts" | "tsx" | "js" | "jsx" | "mjs" => Some(Framework::Jest),
        _ => None,
    }
}

/// Parsed test name with the 1-indexed line it was found on.
#[derive(Debug, PartialEq)]
struct ParsedTest {
    name: String,
    line: u32,
}

fn parse_test_names(framework: Framework, content: &str) -> Vec<ParsedTest> {
    let mut parsed = Vec::new();
    let mut rust_attr_pending = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = raw.trim_start();
        match framework {
            Framework::Jest => {
                for caps in jest_name_re().captures_iter(raw) {
                    parsed.push(ParsedTest {
                        name: caps[1].to_string(),
                        line: line_no,
                    });
                }
            }
            Framework::Pytest => {
                if let Some(caps) = pytest_name_re().captures(trimmed) {
                    parsed.push(ParsedTest {
                        name: caps[1].to_string(),
                        line: line_no,
                    });
                }
            }
            Framework::GoTest => {
                if let Some(caps) = go_name_re().captures(trimmed) {
                    parsed.push(ParsedTest {
                        name: caps[1].to_string(),
                        line: line_no,
                    });
                }
            }
            Framework::RustTest => {
                if rust_attr_re().is_match(trimmed) {
                    rust_attr_pending = true;
                } else if rust_attr_pending {
                    if let Some(caps) = rust_fn_re().captures(trimmed) {
                        parsed.push(ParsedTest {
                            name: caps[1].to_string(),
                            line: line_no,
                        });
                        rust_attr_pending = false;
                    }
                }
            }
        }
    }

    parsed
}

/// Build the test map from one discovery pass.
pub fn build_test_map(files: &[DiscoveredFile]) -> TestMap {
    let mut tests = Vec::new();

    for file in files {
        if !is_test_file(&file.rel_path) {
            continue;
        }
        let parsed = detect_framework(&file.rel_path)
            .and_then(|framework| {
                fs::read_to_string(&file.abs_path)
                    .ok()
                    .map(|content| parse_test_names(framework, &content))
            })
            .unwrap_or_default();

        tests.extend(entries_for_file(&file.rel_path, parsed));
    }

    info!("test map: {} entries", tests.len());
    TestMap {
        schema_version: TEST_MAP_SCHEMA_VERSION.to_string(),
        tests,
    }
}

/// Entries for one test file: one per parsed name, or a single unnamed
/// placeholder. Unnamed ids use the line when known, otherwise a 1-based
/// per-file counter.
fn entries_for_file(rel_path: &str, parsed: Vec<ParsedTest>) -> Vec<TestEntry> {
    let packages = package_of(rel_path);
    let mut unnamed_counter = 0u32;

    let make = |name: Option<String>, line: Option<u32>, counter: &mut u32| -> TestEntry {
        let test_id = match (&name, line) {
            (Some(n), _) => format!("{}::{}", rel_path, n),
            (None, Some(l)) => format!("{}::unnamed_test:L{}", rel_path, l),
            (None, None) => {
                *counter += 1;
                format!("{}::unnamed_test:{}", rel_path, counter)
            }
        };
        TestEntry {
            test_id,
            file: rel_path.to_string(),
            tags: tags_of(rel_path, name.as_deref()),
            tier: tier_of(rel_path, name.as_deref()),
            name,
            files_touched: Vec::new(),
            packages: packages.clone(),
        }
    };

    if parsed.is_empty() {
        debug!("no tests parsed in {}, emitting placeholder", rel_path);
        return vec![make(None, None, &mut unnamed_counter)];
    }

    parsed
        .into_iter()
        .map(|t| make(Some(t.name), Some(t.line), &mut unnamed_counter))
        .collect()
}

fn tier_of(rel_path: &str, name: Option<&str>) -> TestTier {
    let haystack = format!("{} {}", rel_path, name.unwrap_or("")).to_lowercase();
    if haystack.contains("integration") || haystack.contains("e2e") {
        TestTier::Integration
    } else if haystack.contains("slow")
        || haystack.contains("benchmark")
        || haystack.contains("perf")
    {
        TestTier::Slow
    } else {
        TestTier::Fast
    }
}

fn tags_of(rel_path: &str, name: Option<&str>) -> Vec<String> {
    let haystack = format!("{} {}", rel_path, name.unwrap_or("")).to_lowercase();
    KNOWN_TAGS
        .iter()
        .filter(|tag| haystack.contains(**tag))
        .map(|tag| tag.to_string())
        .collect()
}

/// First meaningful path component, with `@scope/name` recognized after a
/// `node_modules` component.
fn package_of(rel_path: &str) -> Vec<String> {
    let segments: Vec<&str> = rel_path.split('/').collect();

    for (idx, segment) in segments.iter().enumerate() {
        if *segment == "node_modules" {
            if let Some(next) = segments.get(idx + 1) {
                if next.starts_with('@') {
                    if let Some(name) = segments.get(idx + 2) {
                        return vec![format!("{}/{}", next, name)];
                    }
                }
                return vec![next.to_string()];
            }
        }
    }

    segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .find(|segment| !NON_PACKAGE_SEGMENTS.contains(*segment) && !segment.contains('.'))
        .map(|segment| vec![segment.to_string()])
        .unwrap_or_default()
}
