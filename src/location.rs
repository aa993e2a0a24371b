//! Self-location of the running updater and derivation of the fixed
//! installation paths.
//!
//! The updater lives inside the installation tree it maintains, so
//! every path it touches is derived from where its own binary really
//! sits. Invocation through symlinks (a launcher in `~/bin`, say) must
//! not change the derived layout, which is why resolution follows the
//! link chain down to the real file before taking the containing
//! directory.
//!
//! Resolution is an ordered fallback chain and never fails outright:
//!
//! 1. `std::fs::canonicalize` of the invocation path;
//! 2. a manual symlink walk of the final component, for filesystems
//!    where full canonicalization is unavailable;
//! 3. the raw invocation path, unresolved.
//!
//! Landing on stage 3 degrades precision but not availability; it is
//! logged as a warning and execution continues.

use crate::constants::{
    BACKUP_ARCHIVE_FILE, DIST_DIR_NAME, DOWNLOAD_FILE, ROLLBACK_MARKER_FILE, SYMLINK_HOP_LIMIT,
};
use crate::utils::platform::safe_canonicalize;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// The resolved location of the running updater.
#[derive(Debug, Clone)]
pub struct ScriptLocation {
    /// The fully resolved path of the updater binary itself.
    pub script_path: PathBuf,
    /// Absolute, normalized directory containing the resolved binary.
    pub script_dir: PathBuf,
    /// True when both resolution facilities failed and the raw
    /// invocation path was used as-is.
    pub degraded: bool,
}

impl ScriptLocation {
    /// Resolve the location of the currently running executable.
    ///
    /// # Errors
    ///
    /// Fails only if the OS cannot report the current executable path
    /// at all; resolution of that path never fails (see module docs).
    pub fn resolve() -> Result<Self> {
        let invoked = env::current_exe().context("Failed to determine the running executable")?;
        Ok(Self::from_invocation(&invoked))
    }

    /// Resolve a location from an explicit invocation path.
    ///
    /// Used when the updater acts on behalf of an installation it is
    /// not physically inside (`--script-path`), and by tests.
    #[must_use]
    pub fn from_invocation(invoked: &Path) -> Self {
        let (resolved, degraded) = resolve_real_path(invoked);
        let raw_dir = resolved
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let script_dir = normalize_dir(&raw_dir);

        debug!(
            script = %resolved.display(),
            dir = %script_dir.display(),
            degraded,
            "resolved updater location"
        );

        Self {
            script_path: resolved,
            script_dir,
            degraded,
        }
    }
}

/// Resolve the real path of `path`, following symlinks.
///
/// Returns the best available resolution and whether the unconditional
/// raw fallback was used.
fn resolve_real_path(path: &Path) -> (PathBuf, bool) {
    if let Ok(canonical) = fs::canonicalize(path) {
        return (canonical, false);
    }

    if let Some(walked) = follow_symlinks(path) {
        return (walked, false);
    }

    warn!(
        path = %path.display(),
        "could not resolve the updater's real path, using the invocation path as-is"
    );
    (path.to_path_buf(), true)
}

/// Walk the symlink chain on the final path component.
///
/// Returns `None` when the path does not exist, a link target cannot be
/// read, or the chain exceeds the hop limit (treated as a cycle).
fn follow_symlinks(path: &Path) -> Option<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..SYMLINK_HOP_LIMIT {
        let metadata = fs::symlink_metadata(&current).ok()?;
        if !metadata.file_type().is_symlink() {
            return Some(current);
        }
        let target = fs::read_link(&current).ok()?;
        current = if target.is_absolute() {
            target
        } else {
            current.parent()?.join(target)
        };
    }
    None
}

/// Normalize a directory path to an absolute form, resolving `..`.
///
/// Prefers filesystem canonicalization; falls back to a lexical
/// normalization against the current working directory so that a
/// degraded resolution still yields a usable absolute path.
fn normalize_dir(dir: &Path) -> PathBuf {
    match safe_canonicalize(dir) {
        Ok(canonical) => canonical,
        Err(_) => lexical_absolute(dir),
    }
}

fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }
    normalized
}

/// All fixed paths of an installation, derived from the script directory.
///
/// The installation root is three levels above the updater's directory;
/// the rollback marker sits one level above it. Neither location is
/// configurable: the on-disk contract is what external rollback tooling
/// relies on.
#[derive(Debug, Clone)]
pub struct DistributionLayout {
    /// Directory containing the resolved updater binary.
    pub script_dir: PathBuf,
    /// Installation root: third ancestor of `script_dir`.
    pub root: PathBuf,
    /// The distribution directory being updated, `<root>/Writing3D`.
    pub dist_dir: PathBuf,
    /// Rollback marker, `<script_dir>/../last_good.txt`.
    pub marker_path: PathBuf,
    /// Backup archive, `<root>/last_good.zip`.
    pub backup_path: PathBuf,
    /// Transient snapshot download target, `<root>/Writing3D.zip`.
    pub download_path: PathBuf,
}

impl DistributionLayout {
    /// Derive the layout from a resolved script directory.
    #[must_use]
    pub fn from_script_dir(script_dir: &Path) -> Self {
        let root = script_dir
            .ancestors()
            .nth(3)
            .unwrap_or(script_dir)
            .to_path_buf();
        let marker_path = script_dir
            .parent()
            .unwrap_or(script_dir)
            .join(ROLLBACK_MARKER_FILE);

        Self {
            script_dir: script_dir.to_path_buf(),
            dist_dir: root.join(DIST_DIR_NAME),
            marker_path,
            backup_path: root.join(BACKUP_ARCHIVE_FILE),
            download_path: root.join(DOWNLOAD_FILE),
            root,
        }
    }

    /// Directory name a snapshot of `branch` extracts to.
    ///
    /// GitHub names the top-level directory after the repository and
    /// branch, with slashes flattened to dashes.
    #[must_use]
    pub fn extracted_dir(&self, branch: &str) -> PathBuf {
        self.root
            .join(format!("{DIST_DIR_NAME}-{}", branch.replace('/', "-")))
    }
}
