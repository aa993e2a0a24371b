//! Command-line interface for the Writing3D updater.
//!
//! Two subcommands:
//!
//! - `update` - run the self-locating update (the default workflow)
//! - `status` - report resolved locations and update readiness without
//!   touching anything
//!
//! Global flags control verbosity and progress output. Each subcommand
//! is its own module with its own argument struct and execution logic.

mod status;
mod update;


use anyhow::Result;
use clap::{Parser, Subcommand};

/// Runtime configuration derived from the global CLI flags.
///
/// Holds what would otherwise be ambient environment state, so tests
/// and programmatic callers can control behavior without touching the
/// process environment until [`apply_to_env`](CliConfig::apply_to_env)
/// runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level filter for tracing output (`None` silences logging).
    pub log_level: Option<String>,

    /// Whether to disable progress bars during downloads.
    pub no_progress: bool,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Called once at the start of execution, before any strategy
    /// runs. Not thread-safe; must run before other threads spawn.
    pub fn apply_to_env(&self) {
        if self.no_progress {
            // Read by the download progress reporting.
            unsafe {
                std::env::set_var(crate::constants::NO_PROGRESS_ENV, "1");
            }
        }
    }

    /// Install a tracing subscriber matching the configured level.
    ///
    /// Respects an explicit `RUST_LOG` when one is set. Safe to call
    /// more than once; later calls are no-ops.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = match &self.log_level {
            Some(level) => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.clone())),
            None => EnvFilter::new("off"),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Top-level CLI for the `w3d-update` binary.
#[derive(Parser)]
#[command(
    name = "w3d-update",
    about = "Update a Writing3D installation in place",
    version,
    long_about = "Updates the Writing3D installation this binary lives in, using git \
                  when a client is available and a zip snapshot of the upstream \
                  repository otherwise."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (command traces, timing).
    ///
    /// Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars (automation, non-ANSI terminals).
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Update the installation to the latest upstream state.
    ///
    /// Selects the git strategy when a client is on PATH, the zip
    /// snapshot fallback otherwise. See [`update::UpdateCommand`].
    Update(update::UpdateCommand),

    /// Report resolved locations and update readiness.
    ///
    /// Read-only; never modifies the installation. See
    /// [`status::StatusCommand`].
    Status(status::StatusCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.apply_to_env();
        config.init_tracing();

        match self.command {
            Commands::Update(cmd) => cmd.execute().await,
            Commands::Status(cmd) => cmd.execute().await,
        }
    }

    /// Build a [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
        }
    }
}
