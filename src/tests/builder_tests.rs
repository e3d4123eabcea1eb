//! End-to-end builds against temporary repositories

use crate::builder::IndexBuilder;
use crate::config::IndexConfig;
use crate::errors::BuildErrorCode;
use crate::tests::fixtures::{polyglot_repo, TestRepo};

#[test]
fn empty_repo_produces_a_minimal_success_index() {
    let repo = TestRepo::new();
    repo.write("README.md", "# Demo\n\nJust a readme.\n");

    let outcome = repo.build_ok();
    assert_eq!(outcome.stats.total_files, 1);
    assert_eq!(outcome.stats.total_symbols, 0);
    assert_eq!(outcome.stats.total_tests, 0);
    assert!(outcome.warnings.is_empty());

    let meta = repo.artifact_json("meta.json");
    assert_eq!(meta["status"], "success");

    let map = repo.artifact_json("repo_map.json");
    let modules = map["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["path"], ".");
    assert_eq!(modules[0]["description"], "Just a readme.");
    assert!(modules[0]["entrypoints"].as_array().unwrap().is_empty());
    assert!(modules[0]["key_files"].as_array().unwrap().is_empty());

    assert!(repo.read_artifact("symbols.jsonl").is_empty());
    let tests = repo.artifact_json("test_map.json");
    assert!(tests["tests"].as_array().unwrap().is_empty());
}

#[test]
fn polyglot_repo_extracts_across_languages() {
    let repo = polyglot_repo();
    let outcome = repo.build_ok();

    assert!(outcome.stats.total_symbols > 0);
    assert_eq!(outcome.stats.total_tests, 1);

    let stream = repo.read_artifact("symbols.jsonl");
    assert!(stream.contains("\"src/lib.rs::Engine\""));
    assert!(stream.contains("\"src/lib.rs::Engine::start\""));
    assert!(stream.contains("\"web/app.ts::render\""));
    assert!(stream.contains("\"web/app.ts::View.draw\""));
    assert!(stream.contains("\"scripts/deploy.py::deploy\""));
    assert!(stream.contains("\"scripts/deploy.py::VERSION\""));

    let tests = repo.artifact_json("test_map.json");
    assert_eq!(
        tests["tests"][0]["test_id"],
        "tests/test_deploy.py::test_deploy_runs"
    );
    assert_eq!(tests["tests"][0]["tier"], "fast");
}

#[test]
fn incremental_rebuild_reuses_symbols_for_untouched_files() {
    let repo = polyglot_repo();
    repo.build_ok();
    let first_stream = repo.read_artifact("symbols.jsonl");
    let first_ledger = repo.artifact_json("file_hashes.json");

    // Change one python file's body.
    repo.write(
        "scripts/deploy.py",
        "VERSION = \"2.0\"\n\ndef deploy(target):\n    \"\"\"Ship it twice.\"\"\"\n    return target\n",
    );

    let outcome = repo.build_ok();
    assert!(outcome.stats.incremental);
    assert_eq!(outcome.stats.files_changed, 1);
    assert_eq!(outcome.stats.files_new, 0);
    assert_eq!(outcome.stats.files_deleted, 0);

    let second_ledger = repo.artifact_json("file_hashes.json");
    let changed_before = &first_ledger["files"]["scripts/deploy.py"]["hash"];
    let changed_after = &second_ledger["files"]["scripts/deploy.py"]["hash"];
    assert_ne!(changed_before, changed_after);

    // Untouched files keep their ledger entry byte-for-byte.
    for path in ["src/lib.rs", "web/app.ts", "README.md"] {
        assert_eq!(
            first_ledger["files"][path], second_ledger["files"][path],
            "{} should be untouched",
            path
        );
    }

    // The unchanged files' symbol lines are identical; the changed file's
    // lines were re-extracted.
    let second_stream = repo.read_artifact("symbols.jsonl");
    for line in first_stream.lines().filter(|l| !l.contains("deploy.py")) {
        assert!(
            second_stream.contains(line),
            "lost cached symbol line: {}",
            line
        );
    }
    assert!(second_stream.contains("2.0"));
    assert!(!second_stream.contains("1.0\\\""));
}

#[test]
fn deleted_files_leave_the_ledger_and_stream() {
    let repo = polyglot_repo();
    repo.build_ok();

    std::fs::remove_file(repo.root.join("web/app.ts")).unwrap();
    let outcome = repo.build_ok();
    assert_eq!(outcome.stats.files_deleted, 1);

    let ledger = repo.artifact_json("file_hashes.json");
    assert!(ledger["files"]["web/app.ts"].is_null());
    assert!(!repo.read_artifact("symbols.jsonl").contains("web/app.ts"));
}

#[test]
fn config_change_forces_full_reindex() {
    let repo = polyglot_repo();
    repo.build_ok();

    let mut config = IndexConfig::default();
    config.max_file_kb += 1;
    let outcome = IndexBuilder::new(repo.options_with(config)).build();
    assert!(outcome.success);
    assert!(!outcome.stats.incremental);
    assert_eq!(outcome.stats.files_new, outcome.stats.total_files);
}

#[test]
fn force_flag_ignores_the_cache() {
    let repo = polyglot_repo();
    repo.build_ok();

    let mut options = repo.options();
    options.force = true;
    let outcome = IndexBuilder::new(options).build();
    assert!(outcome.success);
    assert!(!outcome.stats.incremental);
}

#[test]
fn candidate_cap_boundary() {
    let repo = TestRepo::new();
    for i in 0..6 {
        repo.write(&format!("f{}.rs", i), "pub fn x() {}\n");
    }

    let mut config = IndexConfig::default();
    config.max_files = 6;
    let outcome = IndexBuilder::new(repo.options_with(config.clone())).build();
    assert!(outcome.success, "count == cap must index");

    config.max_files = 5;
    let outcome = IndexBuilder::new(repo.options_with(config)).build();
    assert!(!outcome.success);
    assert_eq!(
        outcome.error.unwrap().code,
        BuildErrorCode::TooManyFiles
    );
}

#[test]
fn fatal_discovery_leaves_previous_artifacts_intact() {
    let repo = polyglot_repo();
    repo.build_ok();
    let before = repo.read_artifact("meta.json");

    repo.write("one_more.rs", "pub fn extra() {}\n");
    let mut config = IndexConfig::default();
    config.max_files = 1;
    let outcome = IndexBuilder::new(repo.options_with(config)).build();
    assert!(!outcome.success);

    assert_eq!(repo.read_artifact("meta.json"), before);
}

#[test]
fn oversize_files_are_skipped_with_a_warning() {
    let repo = TestRepo::new();
    repo.write("small.rs", "pub fn ok() {}\n");
    repo.write("big.rs", &"x".repeat(3 * 1024));

    let mut config = IndexConfig::default();
    config.max_file_kb = 2;
    let outcome = IndexBuilder::new(repo.options_with(config)).build();
    assert!(outcome.success);
    assert_eq!(outcome.stats.total_files, 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].code, "ARK_INDEX_FILE_SKIPPED");
    assert_eq!(outcome.warnings[0].file.as_deref(), Some("big.rs"));

    let meta = repo.artifact_json("meta.json");
    assert_eq!(meta["status"], "partial");
}

#[test]
fn arkignore_patterns_narrow_the_walk() {
    let repo = TestRepo::new();
    repo.write(".arkignore", "# local excludes\ngenerated/**\n");
    repo.write("src/lib.rs", "pub fn keep() {}\n");
    repo.write("generated/out.rs", "pub fn drop_me() {}\n");

    let outcome = repo.build_ok();
    assert_eq!(outcome.stats.total_code_files, 1);
    assert!(!repo.read_artifact("symbols.jsonl").contains("drop_me"));
}

#[test]
fn gitignore_is_respected_when_enabled() {
    let repo = TestRepo::new();
    repo.write(".gitignore", "ignored/\n");
    repo.write("src/lib.rs", "pub fn keep() {}\n");
    repo.write("ignored/hidden.rs", "pub fn gone() {}\n");
    // An ignore-file walk only applies inside a git work tree.
    std::fs::create_dir_all(repo.root.join(".git")).unwrap();

    let outcome = repo.build_ok();
    let ledger = repo.artifact_json("file_hashes.json");
    assert!(ledger["files"]["ignored/hidden.rs"].is_null());
    assert!(!ledger["files"]["src/lib.rs"].is_null());
    assert!(outcome.stats.total_files >= 2);
}
