//! Platform helpers: external command detection and path canonicalization.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Returns the git command name for the current platform.
///
/// Windows installations expose `git.exe`; everywhere else plain `git`
/// relies on PATH resolution.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if cfg!(windows) { "git.exe" } else { "git" }
}

/// Checks whether a command is available in the system PATH.
///
/// Strategy selection hinges on this probe: a missing version-control
/// client is not an error, it is the signal to fall back to the archive
/// strategy.
///
/// # Examples
///
/// ```rust,no_run
/// use w3d_updater::utils::platform::command_exists;
///
/// if command_exists("git") {
///     println!("git is available");
/// }
/// ```
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Canonicalizes a path, resolving symlinks and `..` components.
///
/// # Errors
///
/// Fails if the path does not exist or a component cannot be read.
/// Callers that must not fail outright (the script-location resolver)
/// treat this as one stage of a fallback chain rather than calling it
/// directly.
pub fn safe_canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize().with_context(|| {
        format!(
            "Failed to canonicalize path: {}\n\n\
             Possible causes:\n\
             - Path does not exist\n\
             - Permission denied\n\
             - Invalid path characters",
            path.display()
        )
    })
}
