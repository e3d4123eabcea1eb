// Ark Index - Repository Index Builder Library
//!
//! Ark Index maintains a multi-resolution, file-backed repository index for
//! coding agents: a structural repo map, a symbol stream, a test catalog and
//! a content-hash ledger, committed atomically under `.ark/index/`.

pub mod artifacts;
pub mod builder;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod extractors;
pub mod git;
pub mod incremental;
pub mod language;
pub mod repo_map;
pub mod test_map;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export the types invokers actually touch
pub use builder::{BuildOptions, BuildOutcome, IndexBuilder, IndexingStats};
pub use config::IndexConfig;
pub use discovery::DiscoveredFile;
pub use errors::{BuildError, BuildErrorCode, IndexWarning, WarningCode};
pub use extractors::{Symbol, SymbolKind, Visibility};
