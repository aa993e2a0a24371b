//! Archive-based update: backup, download, extract, swap.
//!
//! The fallback strategy for hosts without a git client. The pipeline
//! is linear and short-circuits on the first failure; each step
//! documents the state it leaves behind so a failed run is
//! recoverable by hand:
//!
//! 1. **Backup** the current tree to `last_good.zip`. Best-effort; a
//!    failure is logged and the run continues.
//! 2. **Download** the branch snapshot to `Writing3D.zip`. The only
//!    recoverable failure: the old tree has not been touched yet, so
//!    the run aborts and reports [`UpdateOutcome::DownloadFailed`].
//! 3. **Extract** the snapshot into the root. On failure the old tree
//!    is intact; the zip and any partial extraction remain.
//! 4. **Remove** the old distribution directory. On failure the tree
//!    may be partially removed; the extracted snapshot remains.
//! 5. **Rename** the extracted `Writing3D-<branch>` directory to
//!    `Writing3D`. On failure no distribution directory exists under
//!    the canonical name; the snapshot tree remains under its own.
//! 6. **Delete** the downloaded zip. Best-effort; the update already
//!    succeeded.
//!
//! Steps 3 through 5 are fatal on failure: once the old tree is gone
//! there is no automatic recovery, so the run stops at the failed step
//! rather than pressing on with a broken installation.

use crate::constants::{DOWNLOAD_TIMEOUT, NO_PROGRESS_ENV, snapshot_url};
use crate::core::UpdaterError;
use crate::location::DistributionLayout;
use crate::update::backup::BackupManager;
use crate::update::{UpdateOptions, UpdateOutcome, UpdateStrategy};
use crate::utils::archive::extract_zip;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

/// Replace the distribution directory from a downloaded snapshot.
///
/// See the module docs for the step-by-step pipeline and the state
/// each step leaves behind on failure.
pub async fn update(layout: &DistributionLayout, opts: &UpdateOptions) -> Result<UpdateOutcome> {
    if opts.skip_backup {
        info!("skipping backup archive on request");
    } else {
        let manager = BackupManager::new(&layout.dist_dir, &layout.backup_path);
        if let Err(err) = manager.create_backup().await {
            warn!("backup failed, continuing without one: {err:#}");
        }
    }

    let url = opts
        .archive_url
        .clone()
        .unwrap_or_else(|| snapshot_url(&opts.branch));

    info!(%url, dest = %layout.download_path.display(), "downloading snapshot");
    if let Err(err) = download_snapshot(&url, &layout.download_path).await {
        // Drop any partial download; the distribution tree is untouched.
        let _ = tokio::fs::remove_file(&layout.download_path).await;
        error!(%url, "snapshot download failed: {err:#}");
        return Ok(UpdateOutcome::DownloadFailed {
            url,
            reason: format!("{err:#}"),
        });
    }

    let archive_path = layout.download_path.clone();
    let root = layout.root.clone();
    let extract_result = tokio::task::spawn_blocking(move || extract_zip(&archive_path, &root))
        .await
        .context("Extraction task panicked")?;
    if let Err(err) = extract_result {
        error!("snapshot extraction failed: {err:#}");
        return Err(UpdaterError::ArchiveError {
            operation: "extracting the snapshot".to_string(),
            path: layout.download_path.display().to_string(),
        }
        .into());
    }

    let extracted = layout.extracted_dir(&opts.branch);
    if !extracted.is_dir() {
        return Err(UpdaterError::ArchiveError {
            operation: "locating the extracted tree".to_string(),
            path: extracted.display().to_string(),
        }
        .into());
    }

    if let Err(err) = tokio::fs::remove_dir_all(&layout.dist_dir).await {
        error!("failed to remove the old tree: {err}");
        return Err(UpdaterError::ArchiveError {
            operation: "removing the old distribution directory".to_string(),
            path: layout.dist_dir.display().to_string(),
        }
        .into());
    }

    if let Err(err) = tokio::fs::rename(&extracted, &layout.dist_dir).await {
        error!("failed to rename the extracted tree: {err}");
        return Err(UpdaterError::ArchiveError {
            operation: "renaming the extracted tree".to_string(),
            path: extracted.display().to_string(),
        }
        .into());
    }

    if let Err(err) = tokio::fs::remove_file(&layout.download_path).await {
        warn!(
            path = %layout.download_path.display(),
            "could not remove the downloaded snapshot: {err}"
        );
    }

    info!(dist = %layout.dist_dir.display(), "distribution replaced from snapshot");
    Ok(UpdateOutcome::Success {
        strategy: UpdateStrategy::Archive,
        revision: None,
    })
}

/// Stream `url` to `dest`, failing loudly on any transfer error.
///
/// Follows redirects (reqwest's default policy) and rejects non-2xx
/// responses. Progress is reported on stderr unless suppressed.
async fn download_snapshot(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("Request failed")?
        .error_for_status()
        .context("Server rejected the request")?;

    let progress = make_progress(response.content_length());

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut response = response;
    while let Some(chunk) = response.chunk().await.context("Transfer interrupted")? {
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        progress.inc(chunk.len() as u64);
    }

    file.flush().await.context("Failed to flush download")?;
    progress.finish_and_clear();
    Ok(())
}

fn make_progress(total: Option<u64>) -> ProgressBar {
    if std::env::var_os(NO_PROGRESS_ENV).is_some() {
        return ProgressBar::hidden();
    }
    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(ProgressStyle::default_bar());
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}
