//! Path normalization and containment checks
//!
//! Every path stored in an artifact is relative to the repository root and
//! uses forward slashes on every platform. These helpers are the only place
//! that normalization happens, so the rest of the pipeline can assume the
//! canonical form.

use std::path::{Component, Path, PathBuf};

/// Convert a path to forward-slash form. Idempotent: already-normalized
/// input comes back unchanged.
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Check whether `rel` stays inside `root` once resolved.
///
/// Rejects absolute inputs, `..`-rooted traversal, and any resolved path
/// that is not prefixed by the root.
pub fn within_root(rel: &str, root: &Path) -> bool {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return false;
    }

    // Resolve lexically: a `..` that climbs past the join point escapes.
    let mut resolved = PathBuf::new();
    for component in rel_path.components() {
        match component {
            Component::ParentDir => {
                if !resolved.pop() {
                    return false;
                }
            }
            Component::CurDir => {}
            Component::Normal(part) => resolved.push(part),
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }

    root.join(&resolved).starts_with(root)
}

/// Convert an absolute path under `root` into the relative forward-slash
/// form stored in artifacts. Returns `None` for paths outside the root.
pub fn to_relative_forward(abs: &Path, root: &Path) -> Option<String> {
    let rel = abs.strip_prefix(root).ok()?;
    let joined = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    Some(joined)
}

/// Parent directory of a relative forward-slash path ("" for top-level).
pub fn parent_dir(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(idx) => &rel[..idx],
        None => "",
    }
}

/// Basename of a relative forward-slash path.
pub fn file_name(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(idx) => &rel[idx + 1..],
        None => rel,
    }
}
