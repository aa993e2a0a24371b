//! Error types for the updater.
//!
//! All fallible operations return `anyhow::Result`, with [`UpdaterError`]
//! as the typed root cause where the failure is one the updater
//! recognizes. At the binary boundary, [`user_friendly_error`] converts
//! whatever bubbled up into an [`ErrorContext`] that renders the error
//! with an actionable suggestion and exits non-zero.
//!
//! Failed fetches and downloads are deliberately part of this taxonomy
//! rather than silent diagnostics: an update run that did not update
//! must be observable from the process exit status.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Typed errors produced by the update pipelines.
///
/// Variants carry enough detail (paths, stderr, URLs) to render a
/// useful diagnostic without re-querying any state.
#[derive(Error, Debug, Clone)]
pub enum UpdaterError {
    /// Git was required but is not installed or not on PATH.
    ///
    /// Only raised when the git strategy is forced; during automatic
    /// selection a missing git client selects the archive strategy
    /// instead.
    #[error("git is not installed or not found in PATH")]
    GitNotFound,

    /// A git command exited unsuccessfully or timed out.
    #[error("git operation failed: {operation}")]
    GitCommandError {
        /// The git subcommand that failed (e.g. "fetch").
        operation: String,
        /// Captured stderr from the failed command.
        stderr: String,
    },

    /// The distribution directory is not a git working copy.
    #[error("not a valid git working copy: {path}")]
    GitRepoInvalid {
        /// The directory that was expected to contain `.git`.
        path: String,
    },

    /// Fetching or hard-resetting to the remote reference failed.
    ///
    /// The working copy is left in whatever state the failed command
    /// produced. The rollback marker was already written and still
    /// names the pre-update revision.
    #[error("failed to update working copy to {reference}")]
    FetchFailed {
        /// The remote reference the reset targeted (e.g. "origin/master").
        reference: String,
        /// Captured stderr from the failed git command.
        stderr: String,
    },

    /// The snapshot archive could not be downloaded.
    ///
    /// Fatal to the archive strategy; the distribution directory has
    /// not been touched when this is raised.
    #[error("failed to download snapshot from {url}")]
    DownloadFailed {
        /// The URL the download was attempted from.
        url: String,
        /// Transfer-level reason (connect error, HTTP status, short read).
        reason: String,
    },

    /// A step of the archive pipeline failed after the download.
    ///
    /// Extraction, removal, and rename failures are all fatal: once the
    /// old tree is gone a partial replacement cannot be recovered
    /// automatically, so the run stops at the first failed step and
    /// reports which one.
    #[error("archive update failed while {operation}: {path}")]
    ArchiveError {
        /// The step that failed ("extracting", "removing", "renaming").
        operation: String,
        /// The path the step was operating on.
        path: String,
    },

    /// The distribution directory does not exist at the derived root.
    #[error("distribution directory not found: {path}")]
    DistributionMissing {
        /// The expected location of the distribution directory.
        path: String,
    },

    /// The rollback marker could not be written.
    ///
    /// Raised before any destructive git step runs; the marker is the
    /// sole undo mechanism, so a failed write stops the update.
    #[error("failed to write rollback marker: {path}")]
    MarkerWriteFailed {
        /// The marker file path.
        path: String,
        /// Underlying I/O error text.
        reason: String,
    },

    /// Fallback for errors without a dedicated variant.
    #[error("{message}")]
    Other {
        /// Human-readable error description.
        message: String,
    },
}

/// An [`UpdaterError`] paired with display-oriented context.
///
/// Built by [`user_friendly_error`] at the binary boundary and rendered
/// with [`display`](ErrorContext::display): the error in red, optional
/// details in yellow, an optional suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying updater error.
    pub error: UpdaterError,
    /// Optional actionable step the user can take.
    pub suggestion: Option<String>,
    /// Optional explanation of why the error occurred.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: UpdaterError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`UpdaterError`] variants and common [`std::io::Error`]
/// kinds, attaching tailored suggestions. Everything else is wrapped
/// verbatim so no information is lost.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(updater_error) = error.downcast_ref::<UpdaterError>() {
        return create_error_context(updater_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(UpdaterError::Other {
                    message: format!("permission denied: {io_error}"),
                })
                .with_suggestion(
                    "Check ownership of the installation directory or re-run with elevated permissions",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(UpdaterError::Other {
                    message: format!("file not found: {io_error}"),
                })
                .with_suggestion("Check that the installation tree is intact");
            }
            _ => {}
        }
    }

    ErrorContext::new(UpdaterError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: UpdaterError) -> ErrorContext {
    match &error {
        UpdaterError::GitNotFound => ErrorContext::new(error).with_suggestion(
            "Install git from https://git-scm.com/ or drop --strategy vcs to use the zip fallback",
        ),
        UpdaterError::GitRepoInvalid { .. } => ErrorContext::new(error)
            .with_details("The git strategy requires the distribution directory to be a clone")
            .with_suggestion("Run with --strategy archive to replace it from a zip snapshot"),
        UpdaterError::FetchFailed { .. } => ErrorContext::new(error)
            .with_details(
                "The working copy may be in a partial state; the rollback marker still \
                 records the pre-update revision",
            )
            .with_suggestion("Check network connectivity and that origin is reachable, then re-run"),
        UpdaterError::DownloadFailed { .. } => ErrorContext::new(error)
            .with_details("The existing installation was left untouched")
            .with_suggestion("Check network connectivity or pass --archive-url to use a mirror"),
        UpdaterError::ArchiveError { .. } => ErrorContext::new(error).with_details(
            "The installation may be incomplete; restore it from the backup archive if present",
        ),
        UpdaterError::DistributionMissing { .. } => ErrorContext::new(error).with_suggestion(
            "The updater expects to live inside the installation tree; \
             use --script-path if it is being run from elsewhere",
        ),
        UpdaterError::MarkerWriteFailed { .. } => ErrorContext::new(error).with_details(
            "The update was aborted before any destructive step because the rollback \
             marker could not be recorded",
        ),
        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updater_error_display() {
        let err = UpdaterError::FetchFailed {
            reference: "origin/master".to_string(),
            stderr: "fatal: unable to access".to_string(),
        };
        assert_eq!(err.to_string(), "failed to update working copy to origin/master");
    }

    #[test]
    fn download_failed_gets_untouched_details() {
        let ctx = user_friendly_error(
            UpdaterError::DownloadFailed {
                url: "https://example.invalid/x.zip".to_string(),
                reason: "connection refused".to_string(),
            }
            .into(),
        );
        assert!(ctx.details.unwrap().contains("untouched"));
    }

    #[test]
    fn io_permission_denied_maps_to_suggestion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let ctx = user_friendly_error(io.into());
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn generic_error_is_preserved() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert!(ctx.error.to_string().contains("something odd"));
    }
}
