//! Directory overview
//!
//! Coarse shape of the repository: how much is here, in which languages,
//! and which top-level directories dominate.

use crate::language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level directories surfaced in the overview.
const TOP_DIRECTORY_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDirectory {
    pub name: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryOverview {
    pub total_files: usize,
    pub total_code_files: usize,
    /// Histogram over resolved language names
    pub languages: BTreeMap<String, usize>,
    pub top_directories: Vec<TopDirectory>,
}

pub fn build_overview(rels: &[String]) -> DirectoryOverview {
    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    let mut top_dirs: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_code_files = 0usize;

    for rel in rels {
        let lang = language::language_of(rel);
        if lang != "unknown" {
            total_code_files += 1;
            *languages.entry(lang.to_string()).or_insert(0) += 1;
        }
        if let Some((top, _)) = rel.split_once('/') {
            *top_dirs.entry(top.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<TopDirectory> = top_dirs
        .into_iter()
        .map(|(name, file_count)| TopDirectory { name, file_count })
        .collect();
    ranked.sort_by(|a, b| {
        b.file_count
            .cmp(&a.file_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(TOP_DIRECTORY_CAP);

    DirectoryOverview {
        total_files: rels.len(),
        total_code_files,
        languages,
        top_directories: ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_and_histogram() {
        let rels = strings(&[
            "README.md",
            "src/lib.rs",
            "src/main.rs",
            "web/app.ts",
            "web/logo.png",
        ]);
        let overview = build_overview(&rels);
        assert_eq!(overview.total_files, 5);
        assert_eq!(overview.total_code_files, 3);
        assert_eq!(overview.languages["rust"], 2);
        assert_eq!(overview.languages["typescript"], 1);
        assert!(!overview.languages.contains_key("unknown"));
    }

    #[test]
    fn top_directories_rank_by_file_count() {
        let mut rels = Vec::new();
        for i in 0..5 {
            rels.push(format!("big/f{}.rs", i));
        }
        rels.push("small/one.rs".to_string());
        rels.push("root.rs".to_string());

        let overview = build_overview(&rels);
        assert_eq!(overview.top_directories[0].name, "big");
        assert_eq!(overview.top_directories[0].file_count, 5);
        assert_eq!(overview.top_directories.len(), 2);
    }

    #[test]
    fn cap_at_ten_directories() {
        let rels: Vec<String> = (0..14).map(|i| format!("d{:02}/f.rs", i)).collect();
        let overview = build_overview(&rels);
        assert_eq!(overview.top_directories.len(), 10);
    }
}
