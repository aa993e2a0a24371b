//! Git-based update: rollback marker, fetch, hard reset.
//!
//! The pipeline is deliberately marker-first: the pre-update revision
//! is on disk before anything destructive runs, so even a fetch that
//! dies halfway leaves a marker that names a state worth restoring.
//! The marker write is not transactional with the reset and does not
//! need to be; a stale-but-correct marker after a failed fetch is
//! exactly the desired end state.

use crate::constants::REMOTE_NAME;
use crate::core::UpdaterError;
use crate::git::{GitRepo, ensure_valid_git_repo};
use crate::location::DistributionLayout;
use crate::update::{UpdateOutcome, UpdateStrategy};
use anyhow::Result;
use std::path::Path;
use tracing::{error, info};

/// Update the working copy to `origin/<branch>`.
///
/// Steps, in order:
///
/// 1. Read HEAD and write it to the rollback marker (fatal on failure;
///    the marker is the sole undo mechanism).
/// 2. `git fetch origin`, then `git reset --hard origin/<branch>`.
///
/// A fetch or reset failure is reported as
/// [`UpdateOutcome::FetchFailed`] and leaves the working copy in
/// whatever partial state the failed command produced. Re-running when
/// already at the remote reference rewrites an identical marker and
/// no-op resets.
pub async fn update(layout: &DistributionLayout, branch: &str) -> Result<UpdateOutcome> {
    ensure_valid_git_repo(&layout.dist_dir)?;
    let repo = GitRepo::new(&layout.dist_dir);

    let current = repo.current_commit().await?;
    write_marker(&layout.marker_path, &current).await?;
    info!(
        revision = %current,
        marker = %layout.marker_path.display(),
        "recorded rollback marker"
    );

    let reference = format!("{REMOTE_NAME}/{branch}");
    if let Err(err) = fetch_and_reset(&repo, &reference).await {
        let stderr = git_stderr(&err);
        error!(%reference, "fetch and reset failed: {stderr}");
        return Ok(UpdateOutcome::FetchFailed { reference, stderr });
    }

    let revision = repo.current_commit().await.ok();
    Ok(UpdateOutcome::Success {
        strategy: UpdateStrategy::Vcs,
        revision,
    })
}

async fn fetch_and_reset(repo: &GitRepo, reference: &str) -> Result<()> {
    repo.fetch(REMOTE_NAME).await?;
    repo.reset_hard(reference).await?;
    Ok(())
}

/// Write the pre-update revision to the marker file, overwriting any
/// prior content. One line, newline-terminated.
pub async fn write_marker(path: &Path, revision: &str) -> Result<()> {
    tokio::fs::write(path, format!("{revision}\n"))
        .await
        .map_err(|err| {
            UpdaterError::MarkerWriteFailed {
                path: path.display().to_string(),
                reason: err.to_string(),
            }
            .into()
        })
}

/// Pull the captured stderr out of a git failure, falling back to the
/// rendered error chain.
fn git_stderr(err: &anyhow::Error) -> String {
    match err.downcast_ref::<UpdaterError>() {
        Some(UpdaterError::GitCommandError { stderr, .. }) if !stderr.is_empty() => {
            stderr.clone()
        }
        _ => format!("{err:#}"),
    }
}
