//! Type-safe git command builder for consistent command execution.
//!
//! Provides a small fluent API over the system `git` binary so that
//! every git invocation in the crate shares the same working-directory
//! handling, timeout management, logging, and error mapping.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::GIT_COMMAND_TIMEOUT;
use crate::core::UpdaterError;
use crate::utils::platform::get_git_command;

/// Builder for constructing and executing git commands.
///
/// Working directories are passed to git with `-C` rather than by
/// changing the process working directory, so invocations are
/// independent of ambient process state.
///
/// # Examples
///
/// ```rust,ignore
/// let head = GitCommand::current_commit()
///     .current_dir("/opt/Writing3D")
///     .execute_stdout()
///     .await?;
/// ```
pub struct GitCommand {
    /// Arguments passed to git, in order.
    args: Vec<String>,

    /// Working directory for the command (passed via `-C`).
    current_dir: Option<std::path::PathBuf>,

    /// Maximum duration to wait for completion (None = no timeout).
    timeout_duration: Option<Duration>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            timeout_duration: Some(GIT_COMMAND_TIMEOUT),
        }
    }
}

impl GitCommand {
    /// Creates a new builder with an empty argument list and the
    /// default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory the command runs against.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Overrides the timeout (`None` disables it).
    #[must_use]
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Execute the command and return its captured output.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::GitCommandError`] when the command exits
    /// unsuccessfully or exceeds the timeout.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        // -C makes git operations independent of the process cwd.
        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.clone());

        cmd.args(&full_args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            target: "git",
            "Executing command: {} {}",
            git_command,
            full_args.join(" ")
        );

        let operation = Self::effective_operation(&full_args);
        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result
                    .context(format!("Failed to execute git {}", full_args.join(" ")))?,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(UpdaterError::GitCommandError {
                        operation,
                        stderr: format!(
                            "git command timed out after {} seconds; this may indicate \
                             network connectivity issues or an authentication prompt \
                             waiting for input",
                            duration.as_secs()
                        ),
                    }
                    .into());
                }
            }
        } else {
            output_future
                .await
                .context(format!("Failed to execute git {}", full_args.join(" ")))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let stdout = String::from_utf8_lossy(&output.stdout);

            tracing::debug!(
                target: "git",
                "Command failed with exit code: {:?}",
                output.status.code()
            );

            return Err(UpdaterError::GitCommandError {
                operation,
                stderr: if stderr.is_empty() {
                    stdout.to_string()
                } else {
                    stderr
                },
            }
            .into());
        }

        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            tracing::debug!(
                target: "git::perf",
                "git {} took {}ms",
                operation,
                elapsed.as_millis()
            );
        }

        Ok(GitCommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Execute the command and return only stdout, trimmed.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute the command, checking only for success.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }

    /// The git subcommand being run, skipping any `-C <dir>` prefix.
    fn effective_operation(full_args: &[String]) -> String {
        let skip = if full_args.first().map(String::as_str) == Some("-C") && full_args.len() > 2 {
            2
        } else {
            0
        };
        full_args
            .get(skip)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Output from a git command.
pub struct GitCommandOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

// Convenience builders for the git operations the updater performs.

impl GitCommand {
    /// Create a fetch command for a single remote.
    #[must_use]
    pub fn fetch(remote: &str) -> Self {
        Self::new().args(["fetch", remote])
    }

    /// Create a hard-reset command targeting a reference.
    #[must_use]
    pub fn reset_hard(reference: &str) -> Self {
        Self::new().args(["reset", "--hard", reference])
    }

    /// Create a command returning the current commit hash.
    #[must_use]
    pub fn current_commit() -> Self {
        Self::new().args(["rev-parse", "HEAD"])
    }
}
