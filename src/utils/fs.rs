//! Filesystem probes and content hashing
//!
//! All probes are failure-tolerant: a file that vanishes or denies access
//! mid-build answers `false` (or an error the caller downgrades to a skip)
//! instead of aborting the pipeline.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Bytes inspected when probing for binary content.
const BINARY_PROBE_BYTES: usize = 8 * 1024;

/// True if the path itself is a symlink. Any I/O failure answers false.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// True if any zero byte appears in the first 8 KiB. Failure answers false.
pub fn is_binary(path: &Path) -> bool {
    let mut file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let mut buf = [0u8; BINARY_PROBE_BYTES];
    let read = match file.read(&mut buf) {
        Ok(n) => n,
        Err(_) => return false,
    };
    buf[..read].contains(&0)
}

/// File size in KiB, rounded up, so any non-empty file is at least 1 KiB.
pub fn size_kb(path: &Path) -> Result<u64> {
    let meta = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    Ok(bytes_to_kb(meta.len()))
}

/// Round a byte count up to whole KiB.
pub fn bytes_to_kb(bytes: u64) -> u64 {
    bytes.div_ceil(1024)
}

/// Full-content SHA-256 digest as `"sha256:" + 64 lowercase hex`.
///
/// An empty file hashes to the well-known digest of the empty octet
/// sequence (`sha256:e3b0c442...`), which falls out of the algorithm.
pub fn hash_file(path: &Path) -> Result<String> {
    let content = fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(hash_bytes(&content))
}

/// SHA-256 digest of an in-memory buffer in ledger format.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}
