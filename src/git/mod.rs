//! Git operations wrapper over the system `git` command.
//!
//! The updater shells out to the installed git binary rather than
//! embedding a git implementation, the same approach Cargo takes with
//! `git-fetch-with-cli`: the system client brings its own
//! authentication (SSH agents, credential helpers, platform keychains)
//! and its own transport stack, both of which an installation's origin
//! remote may depend on.
//!
//! Only the operations the update engine needs are exposed: reading
//! the current revision, fetching a remote, and hard-resetting to a
//! reference. Everything runs through [`GitCommand`] so working
//! directories are passed explicitly with `-C` and never via process
//! working-directory mutation.

pub mod command_builder;

use crate::constants::GIT_FETCH_TIMEOUT;
use crate::core::UpdaterError;
use crate::git::command_builder::GitCommand;
use crate::utils::platform::{command_exists, get_git_command};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A handle to a local git working copy.
///
/// Holds only the repository path; all state queries go straight to
/// git, so external operations on the same working copy are always
/// observed.
///
/// # Examples
///
/// ```rust,no_run
/// use w3d_updater::git::GitRepo;
///
/// # async fn example() -> anyhow::Result<()> {
/// let repo = GitRepo::new("/opt/Writing3D");
/// if repo.is_git_repo() {
///     let head = repo.current_commit().await?;
///     println!("installed revision: {head}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Creates a handle for an existing local repository.
    ///
    /// Does not validate the path; use [`is_git_repo`](Self::is_git_repo)
    /// or [`ensure_valid_git_repo`] before performing operations.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The working copy path this handle operates on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the path looks like a git working copy.
    #[must_use]
    pub fn is_git_repo(&self) -> bool {
        self.path.join(".git").exists()
    }

    /// Returns the commit hash of HEAD.
    pub async fn current_commit(&self) -> Result<String> {
        GitCommand::current_commit()
            .current_dir(&self.path)
            .execute_stdout()
            .await
            .context("Failed to get current commit")
    }

    /// Fetches updates from the named remote.
    ///
    /// Uses the dedicated fetch timeout so a dead network fails the
    /// update in bounded time.
    pub async fn fetch(&self, remote: &str) -> Result<()> {
        GitCommand::fetch(remote)
            .with_timeout(Some(GIT_FETCH_TIMEOUT))
            .current_dir(&self.path)
            .execute_success()
            .await
    }

    /// Hard-resets the working copy to exactly match `reference`.
    ///
    /// Discards all local modifications; no merge, no stash. Re-running
    /// against an unchanged reference is a no-op that leaves the
    /// working copy byte-identical.
    pub async fn reset_hard(&self, reference: &str) -> Result<()> {
        GitCommand::reset_hard(reference)
            .current_dir(&self.path)
            .execute_success()
            .await
    }
}

/// Checks whether a git client is installed and on PATH.
///
/// This is the strategy-selection probe: absence is not an error, it
/// selects the archive fallback.
#[must_use]
pub fn is_git_installed() -> bool {
    command_exists(get_git_command())
}

/// Ensures git is available, with a typed error otherwise.
///
/// # Errors
///
/// Returns [`UpdaterError::GitNotFound`] when the client is missing.
pub fn ensure_git_available() -> Result<()> {
    if is_git_installed() {
        Ok(())
    } else {
        Err(UpdaterError::GitNotFound.into())
    }
}

/// Ensures `path` is a git working copy, with a typed error otherwise.
///
/// # Errors
///
/// Returns [`UpdaterError::GitRepoInvalid`] when no `.git` is present.
pub fn ensure_valid_git_repo(path: &Path) -> Result<()> {
    if path.join(".git").exists() {
        Ok(())
    } else {
        Err(UpdaterError::GitRepoInvalid {
            path: path.display().to_string(),
        }
        .into())
    }
}
