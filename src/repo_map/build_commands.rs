//! Canonical build-command detection
//!
//! Manifests are probed in a fixed order and the first one present decides.
//! Makefiles and package.json contribute their actual targets/scripts; the
//! ecosystem manifests map to their conventional commands.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildCommands {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_full: Option<String>,
}

impl BuildCommands {
    fn is_empty(&self) -> bool {
        self.build.is_none() && self.test.is_none() && self.test_full.is_none()
    }
}

fn makefile_target_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9_.-]+)\s*:([^=]|$)").unwrap())
}

/// Detect build commands from the repository root, first manifest wins.
pub fn detect_build_commands(root: &Path) -> Option<BuildCommands> {
    let detectors: [(&str, fn(&str) -> BuildCommands); 6] = [
        ("Makefile", from_makefile),
        ("package.json", from_package_json),
        ("Cargo.toml", |_| cargo_commands()),
        ("pyproject.toml", |_| python_commands()),
        ("setup.py", |_| python_commands()),
        ("go.mod", |_| go_commands()),
    ];

    for (manifest, detect) in detectors {
        let path = root.join(manifest);
        if let Ok(content) = fs::read_to_string(&path) {
            let commands = detect(&content);
            return if commands.is_empty() {
                None
            } else {
                Some(commands)
            };
        }
    }
    None
}

fn from_makefile(content: &str) -> BuildCommands {
    let targets: HashSet<&str> = content
        .lines()
        .filter_map(|line| {
            makefile_target_re()
                .captures(line)
                .map(|c| c.get(1).unwrap().as_str())
        })
        .filter(|t| !t.starts_with('.'))
        .collect();

    let pick = |names: &[&str]| -> Option<String> {
        names
            .iter()
            .find(|n| targets.contains(**n))
            .map(|n| format!("make {}", n))
    };

    BuildCommands {
        build: pick(&["build", "all"]),
        test: pick(&["test"]),
        test_full: pick(&["test-all", "test-full", "test"]),
    }
}

fn from_package_json(content: &str) -> BuildCommands {
    let parsed: serde_json::Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(_) => return BuildCommands::default(),
    };
    let scripts = match parsed.get("scripts").and_then(|s| s.as_object()) {
        Some(s) => s,
        None => return BuildCommands::default(),
    };

    let has = |name: &str| scripts.contains_key(name);
    let test_full = ["test:full", "test:all", "test:ci"]
        .iter()
        .find(|s| has(s))
        .map(|s| format!("npm run {}", s))
        .or_else(|| has("test").then(|| "npm test".to_string()));

    BuildCommands {
        build: has("build").then(|| "npm run build".to_string()),
        test: has("test").then(|| "npm test".to_string()),
        test_full,
    }
}

fn cargo_commands() -> BuildCommands {
    BuildCommands {
        build: Some("cargo build".to_string()),
        test: Some("cargo test".to_string()),
        test_full: Some("cargo test --all-features".to_string()),
    }
}

fn python_commands() -> BuildCommands {
    BuildCommands {
        build: Some("pip install -e .".to_string()),
        test: Some("pytest".to_string()),
        test_full: None,
    }
}

fn go_commands() -> BuildCommands {
    BuildCommands {
        build: Some("go build ./...".to_string()),
        test: Some("go test ./...".to_string()),
        test_full: Some("go test -race ./...".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn makefile_targets_are_scanned() {
        let commands = from_makefile("all: build\n\nbuild:\n\tcc main.c\n\ntest:\n\t./run_tests\n");
        assert_eq!(commands.build.as_deref(), Some("make build"));
        assert_eq!(commands.test.as_deref(), Some("make test"));
        assert_eq!(commands.test_full.as_deref(), Some("make test"));
    }

    #[test]
    fn makefile_prefers_dedicated_full_target() {
        let commands = from_makefile("test:\n\ttrue\n\ntest-all:\n\ttrue\n");
        assert_eq!(commands.test_full.as_deref(), Some("make test-all"));
        assert!(commands.build.is_none());
    }

    #[test]
    fn package_json_scripts() {
        let commands = from_package_json(
            r#"{"scripts": {"build": "tsc", "test": "jest", "test:ci": "jest --ci"}}"#,
        );
        assert_eq!(commands.build.as_deref(), Some("npm run build"));
        assert_eq!(commands.test.as_deref(), Some("npm test"));
        assert_eq!(commands.test_full.as_deref(), Some("npm run test:ci"));
    }

    #[test]
    fn first_manifest_in_order_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Makefile"), "build:\n\ttrue\n").unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();

        let commands = detect_build_commands(dir.path()).unwrap();
        assert_eq!(commands.build.as_deref(), Some("make build"));
    }

    #[test]
    fn ecosystem_manifests_use_fixed_commands() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module demo\n").unwrap();
        let commands = detect_build_commands(dir.path()).unwrap();
        assert_eq!(commands.test.as_deref(), Some("go test ./..."));
    }

    #[test]
    fn no_manifest_means_no_commands() {
        let dir = tempfile::tempdir().unwrap();
        assert!(detect_build_commands(dir.path()).is_none());
    }
}
