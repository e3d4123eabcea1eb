//! Offline artifact verification
//!
//! Validates a cached index without re-indexing: all five files present and
//! parseable, the schema major supported, and the coarse counts in `meta`
//! consistent with the ledger and the symbol stream. Count drift is a
//! warning, not an error; a reader can still use the set.

use crate::artifacts::{
    IndexMeta, ARTIFACT_FILES, FILE_HASHES_FILE, META_FILE, REPO_MAP_FILE, SYMBOLS_FILE,
    TEST_MAP_FILE,
};
use crate::incremental::FileHashLedger;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported major of `meta.schema_version`.
const SUPPORTED_META_MAJOR: u64 = 1;

#[derive(Debug, Default)]
pub struct VerifyReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Verify the artifact set in `dir`.
pub fn verify_artifacts(dir: &Path) -> VerifyReport {
    let mut report = VerifyReport::default();

    for name in ARTIFACT_FILES {
        if !dir.join(name).exists() {
            report.errors.push(format!("missing artifact: {}", name));
        }
    }
    if !report.errors.is_empty() {
        return report;
    }

    let meta = parse_json::<IndexMeta>(dir, META_FILE, &mut report);
    let ledger = parse_json::<FileHashLedger>(dir, FILE_HASHES_FILE, &mut report);
    parse_json::<serde_json::Value>(dir, REPO_MAP_FILE, &mut report);
    parse_json::<serde_json::Value>(dir, TEST_MAP_FILE, &mut report);
    let symbol_lines = parse_symbol_stream(dir, &mut report);

    if let Some(meta) = &meta {
        match IndexMeta::major_of(&meta.schema_version) {
            Some(SUPPORTED_META_MAJOR) => {}
            Some(other) => report.errors.push(format!(
                "unsupported schema major {} (supported: {})",
                other, SUPPORTED_META_MAJOR
            )),
            None => report.errors.push(format!(
                "unparseable schema version {:?}",
                meta.schema_version
            )),
        }

        if let Some(ledger) = &ledger {
            if meta.stats.total_files != ledger.files.len() {
                report.warnings.push(format!(
                    "meta.stats.total_files is {} but the ledger holds {} files",
                    meta.stats.total_files,
                    ledger.files.len()
                ));
            }
        }
        if let Some(count) = symbol_lines {
            if meta.stats.total_symbols != count {
                report.warnings.push(format!(
                    "meta.stats.total_symbols is {} but the symbol stream holds {} records",
                    meta.stats.total_symbols, count
                ));
            }
        }
    }

    report.valid = report.errors.is_empty();
    debug!(
        "verification: valid={} ({} errors, {} warnings)",
        report.valid,
        report.errors.len(),
        report.warnings.len()
    );
    report
}

fn parse_json<T: serde::de::DeserializeOwned>(
    dir: &Path,
    name: &str,
    report: &mut VerifyReport,
) -> Option<T> {
    let content = match fs::read_to_string(dir.join(name)) {
        Ok(content) => content,
        Err(err) => {
            report.errors.push(format!("unreadable {}: {}", name, err));
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            report.errors.push(format!("unparseable {}: {}", name, err));
            None
        }
    }
}

/// Count of non-empty, individually parseable symbol lines.
fn parse_symbol_stream(dir: &Path, report: &mut VerifyReport) -> Option<usize> {
    let content = match fs::read_to_string(dir.join(SYMBOLS_FILE)) {
        Ok(content) => content,
        Err(err) => {
            report
                .errors
                .push(format!("unreadable {}: {}", SYMBOLS_FILE, err));
            return None;
        }
    };

    let mut count = 0usize;
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = serde_json::from_str::<serde_json::Value>(line) {
            report.errors.push(format!(
                "unparseable {} line {}: {}",
                SYMBOLS_FILE,
                idx + 1,
                err
            ));
            return None;
        }
        count += 1;
    }
    Some(count)
}
