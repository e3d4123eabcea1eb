// Ark Index Test Infrastructure
//
// Unit tests live in #[cfg(test)] blocks next to the code they exercise;
// this tree holds the cross-module suites that drive the pipeline against
// real temporary repositories.


// ============================================================================
// PIPELINE TESTS - Full builds against temp repos
// ============================================================================
pub mod builder_tests; // End-to-end build, incremental reuse, fatal paths
