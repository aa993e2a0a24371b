//! The `update` subcommand: the top-level update orchestration.
//!
//! Resolves where the updater really lives, derives the installation
//! layout from that location, selects a strategy, and executes it.
//! Both strategies receive explicit paths; the process working
//! directory is never changed.
//!
//! # Examples
//!
//! ```bash
//! w3d-update update                    # probe for git, update master
//! w3d-update update --branch develop   # track a different branch
//! w3d-update update --strategy archive # force the zip fallback
//! ```

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use crate::constants::DEFAULT_BRANCH;
use crate::core::UpdaterError;
use crate::location::{DistributionLayout, ScriptLocation};
use crate::update::{self, UpdateOptions, UpdateOutcome, UpdateStrategy};

/// Strategy names accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Fetch and hard-reset with the git client.
    Vcs,
    /// Replace the tree from a downloaded zip snapshot.
    Archive,
}

impl From<StrategyArg> for UpdateStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Vcs => Self::Vcs,
            StrategyArg::Archive => Self::Archive,
        }
    }
}

/// Command to update the installation in place.
#[derive(Args)]
pub struct UpdateCommand {
    /// Branch to track on the remote.
    #[arg(long, default_value = DEFAULT_BRANCH)]
    branch: String,

    /// Download the snapshot from this URL instead of the upstream
    /// archive location (archive strategy only).
    #[arg(long, value_name = "URL")]
    archive_url: Option<String>,

    /// Force a strategy instead of probing for a git client.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Skip the pre-update backup archive (archive strategy only).
    #[arg(long)]
    no_backup: bool,

    /// Resolve locations as if the updater lived at this path.
    ///
    /// Intended for updating an installation the binary is not
    /// physically inside, and for test fixtures.
    #[arg(long, value_name = "PATH")]
    script_path: Option<PathBuf>,
}

impl UpdateCommand {
    /// Run the update and report the outcome.
    ///
    /// # Errors
    ///
    /// Any failure, including the recoverable fetch/download outcomes,
    /// is returned as an error so the process exits non-zero.
    pub async fn execute(self) -> Result<()> {
        let location = match &self.script_path {
            Some(path) => ScriptLocation::from_invocation(path),
            None => ScriptLocation::resolve()?,
        };
        let layout = DistributionLayout::from_script_dir(&location.script_dir);
        debug!(
            root = %layout.root.display(),
            dist = %layout.dist_dir.display(),
            "derived installation layout"
        );

        let opts = UpdateOptions {
            branch: self.branch,
            archive_url: self.archive_url,
            skip_backup: self.no_backup,
            strategy: self.strategy.map(Into::into),
        };

        match update::run_update(&layout, &opts).await? {
            UpdateOutcome::Success { strategy, revision } => {
                match revision {
                    Some(revision) => println!(
                        "{} {} is now at {} ({} strategy)",
                        "Updated:".green().bold(),
                        layout.dist_dir.display(),
                        revision,
                        strategy
                    ),
                    None => println!(
                        "{} {} replaced from snapshot ({} strategy)",
                        "Updated:".green().bold(),
                        layout.dist_dir.display(),
                        strategy
                    ),
                }
                Ok(())
            }
            UpdateOutcome::FetchFailed { reference, stderr } => {
                eprintln!(
                    "{} could not update the working copy; the rollback marker at {} \
                     still records the previous revision",
                    "warning:".yellow().bold(),
                    layout.marker_path.display()
                );
                Err(UpdaterError::FetchFailed { reference, stderr }.into())
            }
            UpdateOutcome::DownloadFailed { url, reason } => {
                Err(UpdaterError::DownloadFailed { url, reason }.into())
            }
        }
    }
}
