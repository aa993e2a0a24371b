//! Writing3D updater CLI entry point.
//!
//! Parses arguments, runs the selected command, and renders any
//! failure as a user-friendly diagnostic before exiting non-zero. A
//! run that did not update must be observable from the exit status.

use anyhow::Result;
use clap::Parser;
use w3d_updater::cli;
use w3d_updater::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
