//! The dual-strategy update engine.
//!
//! An update runs one of two mutually exclusive strategies against the
//! distribution directory:
//!
//! - **[`UpdateStrategy::Vcs`]** ([`vcs`]): record the current revision
//!   to the rollback marker, fetch the remote, hard-reset to
//!   `origin/<branch>`. Requires a git client and a working copy.
//! - **[`UpdateStrategy::Archive`]** ([`archive`]): zip the current
//!   tree as a backup, download a snapshot of the branch, extract it,
//!   and swap it into place. Requires only HTTP reachability.
//!
//! Selection probes for a git client on PATH; absence selects the
//! archive fallback. Both strategies receive explicit paths through
//! [`DistributionLayout`] and never change the process working
//! directory.
//!
//! Concurrent updater runs against the same installation are
//! unsupported: neither strategy takes a lock, so interleaved resets
//! or directory swaps produce undefined results.

pub mod archive;
pub mod backup;
pub mod vcs;

#[cfg(test)]
mod tests;

use crate::core::UpdaterError;
use crate::git::ensure_git_available;
use crate::location::DistributionLayout;
use crate::utils::platform::{command_exists, get_git_command};
use anyhow::Result;
use std::fmt;
use tracing::{debug, info};

/// The two mutually exclusive update mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Fetch and hard-reset an existing working copy with git.
    Vcs,
    /// Replace the tree from a downloaded zip snapshot.
    Archive,
}

impl UpdateStrategy {
    /// Select a strategy by probing for a git client on PATH.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_with(command_exists)
    }

    /// Select a strategy with an injected availability probe.
    ///
    /// Selection is a pure function of the probe: a present client
    /// always yields [`Vcs`](Self::Vcs), an absent one always yields
    /// [`Archive`](Self::Archive), regardless of what is on disk.
    pub fn detect_with(probe: impl Fn(&str) -> bool) -> Self {
        if probe(get_git_command()) {
            Self::Vcs
        } else {
            Self::Archive
        }
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vcs => write!(f, "git"),
            Self::Archive => write!(f, "archive"),
        }
    }
}

/// What an update run produced, for user-visible reporting.
///
/// The failure variants describe the two recoverable end states named
/// by the update contract; pipeline failures after the archive
/// download are not recoverable and propagate as errors instead.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The strategy ran to completion.
    Success {
        /// Which strategy performed the update.
        strategy: UpdateStrategy,
        /// Post-update revision, when the strategy can know it.
        revision: Option<String>,
    },
    /// Fetch or reset failed; the marker names the pre-update revision.
    FetchFailed {
        /// The remote reference the reset targeted.
        reference: String,
        /// Captured git stderr.
        stderr: String,
    },
    /// The snapshot download failed; the installation is untouched.
    DownloadFailed {
        /// The URL the download was attempted from.
        url: String,
        /// Transfer-level failure reason.
        reason: String,
    },
}

impl UpdateOutcome {
    /// Whether the update completed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Options controlling a single update run.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Branch tracked on the remote.
    pub branch: String,
    /// Override for the snapshot URL (archive strategy).
    pub archive_url: Option<String>,
    /// Skip the pre-update backup archive (archive strategy).
    pub skip_backup: bool,
    /// Force a strategy instead of probing.
    pub strategy: Option<UpdateStrategy>,
}

/// Run an update against the installation described by `layout`.
///
/// Verifies the distribution directory exists, selects a strategy, and
/// delegates. A forced git strategy still requires the client to be
/// present; automatic selection never does.
///
/// # Errors
///
/// Fails on precondition violations (missing distribution directory,
/// forced-but-absent git client, non-repository working copy), marker
/// write failures, and unrecoverable archive-pipeline failures. The
/// recoverable fetch/download failures are reported through
/// [`UpdateOutcome`] instead.
pub async fn run_update(
    layout: &DistributionLayout,
    opts: &UpdateOptions,
) -> Result<UpdateOutcome> {
    if !layout.dist_dir.is_dir() {
        return Err(UpdaterError::DistributionMissing {
            path: layout.dist_dir.display().to_string(),
        }
        .into());
    }

    let strategy = match opts.strategy {
        Some(forced) => {
            debug!(%forced, "strategy forced on the command line");
            if forced == UpdateStrategy::Vcs {
                ensure_git_available()?;
            }
            forced
        }
        None => UpdateStrategy::detect(),
    };

    info!(%strategy, dist = %layout.dist_dir.display(), "starting update");

    match strategy {
        UpdateStrategy::Vcs => vcs::update(layout, &opts.branch).await,
        UpdateStrategy::Archive => archive::update(layout, opts).await,
    }
}
