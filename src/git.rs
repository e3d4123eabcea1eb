// Git integration
//
// git is invoked only to read HEAD; a missing binary or a non-repo both
// resolve to a null commit, never a failure. The subprocess gets an explicit
// minimum environment instead of inheriting the caller's.

use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Environment variables a child process may inherit.
const ENV_ALLOWLIST_UNIX: [&str; 6] = ["PATH", "HOME", "USER", "TERM", "NO_COLOR", "FORCE_COLOR"];

#[cfg(windows)]
const ENV_ALLOWLIST_WINDOWS: [&str; 7] = [
    "USERPROFILE",
    "APPDATA",
    "LOCALAPPDATA",
    "TEMP",
    "TMP",
    "SystemRoot",
    "COMSPEC",
];

/// Variable-name prefix always passed through.
const ENV_PASSTHROUGH_PREFIX: &str = "ARK_";

/// Build a command with the allow-listed environment only.
pub fn scoped_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.env_clear();

    for (key, value) in std::env::vars_os() {
        let Some(name) = key.to_str() else { continue };
        let allowed = ENV_ALLOWLIST_UNIX.contains(&name)
            || name.starts_with(ENV_PASSTHROUGH_PREFIX)
            || windows_allowed(name);
        if allowed {
            cmd.env(&key, &value);
        }
    }
    cmd
}

#[cfg(windows)]
fn windows_allowed(name: &str) -> bool {
    ENV_ALLOWLIST_WINDOWS.contains(&name)
}

#[cfg(not(windows))]
fn windows_allowed(_name: &str) -> bool {
    false
}

/// Current HEAD commit of the repository at `root`, if any.
pub fn resolve_head(root: &Path) -> Option<String> {
    let output = scoped_command("git")
        .arg("-C")
        .arg(root)
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("git rev-parse failed; recording null commit");
        return None;
    }

    let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if commit.is_empty() {
        None
    } else {
        Some(commit)
    }
}
