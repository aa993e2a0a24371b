//! The `status` subcommand: report locations and readiness, read-only.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::constants::REMOTE_URL;
use crate::git::GitRepo;
use crate::location::{DistributionLayout, ScriptLocation};
use crate::update::UpdateStrategy;

/// Command to report the resolved installation state without updating.
#[derive(Args)]
pub struct StatusCommand {
    /// Resolve locations as if the updater lived at this path.
    #[arg(long, value_name = "PATH")]
    script_path: Option<PathBuf>,
}

impl StatusCommand {
    /// Print the resolved layout, selected strategy, and local state.
    pub async fn execute(self) -> Result<()> {
        let location = match &self.script_path {
            Some(path) => ScriptLocation::from_invocation(path),
            None => ScriptLocation::resolve()?,
        };
        let layout = DistributionLayout::from_script_dir(&location.script_dir);

        println!("{}", "Writing3D updater status".bold());
        if location.degraded {
            println!(
                "  {} updater path could not be fully resolved",
                "note:".yellow()
            );
        }
        println!("  updater dir:   {}", layout.script_dir.display());
        println!("  root:          {}", layout.root.display());
        println!("  distribution:  {}", format_presence(&layout.dist_dir));
        println!("  upstream:      {REMOTE_URL}");
        println!("  strategy:      {}", UpdateStrategy::detect());

        let repo = GitRepo::new(&layout.dist_dir);
        if repo.is_git_repo() {
            match repo.current_commit().await {
                Ok(revision) => println!("  revision:      {revision}"),
                Err(_) => println!("  revision:      {}", "unreadable".yellow()),
            }
        } else {
            println!("  revision:      not a working copy");
        }

        match std::fs::read_to_string(&layout.marker_path) {
            Ok(contents) => println!("  last good:     {}", contents.trim()),
            Err(_) => println!("  last good:     none recorded"),
        }
        println!("  backup:        {}", format_presence(&layout.backup_path));

        Ok(())
    }
}

fn format_presence(path: &std::path::Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} ({})", path.display(), "missing".yellow())
    }
}
