//! CODEOWNERS parsing
//!
//! First hit among the three conventional locations wins. Lines must carry a
//! pattern plus at least one `@`-prefixed owner to be recorded.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const CODEOWNERS_LOCATIONS: [&str; 3] = ["CODEOWNERS", ".github/CODEOWNERS", "docs/CODEOWNERS"];

/// Parse the repository's CODEOWNERS file into `{pattern: [owners]}`.
pub fn parse_codeowners(root: &Path) -> BTreeMap<String, Vec<String>> {
    for location in CODEOWNERS_LOCATIONS {
        let path = root.join(location);
        if let Ok(content) = fs::read_to_string(&path) {
            debug!("parsing owners from {}", location);
            return parse_content(&content);
        }
    }
    BTreeMap::new()
}

fn parse_content(content: &str) -> BTreeMap<String, Vec<String>> {
    let mut owners = BTreeMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let pattern = match parts.next() {
            Some(p) if !p.starts_with('@') => p,
            _ => continue,
        };
        let line_owners: Vec<String> = parts
            .filter(|p| p.starts_with('@'))
            .map(String::from)
            .collect();
        if !line_owners.is_empty() {
            owners.insert(pattern.to_string(), line_owners);
        }
    }
    owners
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_patterns_and_owners() {
        let content = "\
# Infra owns the build
/build/** @org/infra

src/api/ @alice @bob
no-owner-here
@orphan-owner-line
";
        let owners = parse_content(content);
        assert_eq!(owners.len(), 2);
        assert_eq!(owners["/build/**"], vec!["@org/infra"]);
        assert_eq!(owners["src/api/"], vec!["@alice", "@bob"]);
    }

    #[test]
    fn first_location_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".github")).unwrap();
        fs::write(dir.path().join("CODEOWNERS"), "a/ @top\n").unwrap();
        fs::write(dir.path().join(".github/CODEOWNERS"), "b/ @nested\n").unwrap();

        let owners = parse_codeowners(dir.path());
        assert!(owners.contains_key("a/"));
        assert!(!owners.contains_key("b/"));
    }

    #[test]
    fn missing_file_is_empty_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_codeowners(dir.path()).is_empty());
    }
}
